//! Built-in checklist catalog.
//!
//! The catalog is fixed at build time: every known checklist is a variant of
//! [`ChecklistId`], and its definition is resolved with an exhaustive match so
//! a missing definition is a compile error rather than a runtime lookup miss.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Identifier of a checklist in the catalog, in flight-phase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistId {
    /// Pre-flight inspection.
    Prevol,
    /// Engine start.
    Demarrage,
    /// Taxi.
    Roulage,
    /// Runway entry preparation.
    EntreePiste,
    /// Takeoff.
    Decollage,
    /// Approach.
    Approche,
    /// Landing.
    Atterrissage,
}

impl ChecklistId {
    /// Every checklist identifier, in catalog order.
    pub const ALL: [ChecklistId; 7] = [
        Self::Prevol,
        Self::Demarrage,
        Self::Roulage,
        Self::EntreePiste,
        Self::Decollage,
        Self::Approche,
        Self::Atterrissage,
    ];

    /// The stable string form used in storage keys and on the command line.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prevol => "prevol",
            Self::Demarrage => "demarrage",
            Self::Roulage => "roulage",
            Self::EntreePiste => "entreepiste",
            Self::Decollage => "decollage",
            Self::Approche => "approche",
            Self::Atterrissage => "atterrissage",
        }
    }

    /// Get the catalog definition for this checklist.
    #[must_use]
    pub fn definition(self) -> &'static ChecklistDefinition {
        match self {
            Self::Prevol => &PREVOL,
            Self::Demarrage => &DEMARRAGE,
            Self::Roulage => &ROULAGE,
            Self::EntreePiste => &ENTREE_PISTE,
            Self::Decollage => &DECOLLAGE,
            Self::Approche => &APPROCHE,
            Self::Atterrissage => &ATTERRISSAGE,
        }
    }
}

impl std::fmt::Display for ChecklistId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecklistId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| Error::unknown_checklist(s))
    }
}

/// An immutable checklist: a title and its ordered steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistDefinition {
    /// Which checklist this is.
    pub id: ChecklistId,
    /// Display title.
    pub title: &'static str,
    /// Ordered step descriptions.
    pub steps: &'static [&'static str],
}

impl ChecklistDefinition {
    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if the definition has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// BLAKE3 fingerprint of the ordered step texts.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        fingerprint_steps(self.steps.iter().copied())
    }
}

/// Hash an ordered sequence of step texts.
///
/// Each step is length-prefixed so that `["ab", "c"]` and `["a", "bc"]`
/// hash differently.
pub(crate) fn fingerprint_steps<'a>(steps: impl Iterator<Item = &'a str>) -> String {
    let mut hasher = blake3::Hasher::new();
    for step in steps {
        hasher.update(&(step.len() as u64).to_le_bytes());
        hasher.update(step.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// All checklist definitions, in catalog order.
pub fn catalog() -> impl Iterator<Item = &'static ChecklistDefinition> {
    ChecklistId::ALL.into_iter().map(ChecklistId::definition)
}

static PREVOL: ChecklistDefinition = ChecklistDefinition {
    id: ChecklistId::Prevol,
    title: "Check-list Prévol",
    steps: &[
        "Documentation de vol vérifiée",
        "Contrôle extérieur effectué",
        "Contrôle visuel moteur effectué",
        "Essence vérifiée (quantité et qualité)",
        "Niveaux d'huile vérifiés",
        "Gouvernes libres et dégagées",
        "Instruments et commutateurs sur OFF",
    ],
};

static DEMARRAGE: ChecklistDefinition = ChecklistDefinition {
    id: ChecklistId::Demarrage,
    title: "Check-list Démarrage",
    steps: &[
        "Frein de parking ON",
        "Commande de vol bloquée en avant",
        "Batterie principale ON",
        "Pompe à essence électrique ON",
        "Magnetos sur BOTH",
        "Contacteur de démarrage ENGAGE",
        "Huile pressurisation OK",
        "Réglage QNH",
        "Radio ON et fréquence réglée",
        "Huile Température 55°C minimum",
    ],
};

static ROULAGE: ChecklistDefinition = ChecklistDefinition {
    id: ChecklistId::Roulage,
    title: "Check-list Roulage",
    steps: &[
        "Frein de parking OFF",
        "Freins testés",
        "Instruments de vol vérifiés",
        "Transpondeur réglé",
        "Radio communication testée",
        "Trim ajusté pour le décollage",
        "Vent vérifié",
        "Annonce radio roulage",
    ],
};

static ENTREE_PISTE: ChecklistDefinition = ChecklistDefinition {
    id: ChecklistId::EntreePiste,
    title: "Check-list Préparation entrée piste",
    steps: &[
        "Ceintures et harnais attachés",
        "Porte et verrière fermées et verrouillées",
        "Piste libre et dégagée",
        "Vent vérifié",
        "Breifing passager effectué",
        "Radio alignement prelancement",
    ],
};

static DECOLLAGE: ChecklistDefinition = ChecklistDefinition {
    id: ChecklistId::Decollage,
    title: "Check-list Décollage",
    steps: &[
        "Frein rotor OFF",
        "Manche libre et en avant",
        "2000 tr/min atteints",
        "Pré-lancement ON",
        "Rotor 150 tr/min manche arrière",
        "Rotor 220 tr/min",
        "Pré-lancement OFF",
        "Puissance maximale",
        "Vitesse de décollage atteinte",
        "Montée initiale",
    ],
};

static APPROCHE: ChecklistDefinition = ChecklistDefinition {
    id: ChecklistId::Approche,
    title: "Check-list Approche",
    steps: &[
        "Vérification météo",
        "Vérification VAC",
        "Radio annonce approche",
    ],
};

static ATTERRISSAGE: ChecklistDefinition = ChecklistDefinition {
    id: ChecklistId::Atterrissage,
    title: "Check-list Atterrissage",
    steps: &[
        "Verticale terrain",
        "Vent vérifié",
        "Circuit d'atterrissage intégré",
        "Vitesse d'approche maintenue",
        "Piste alignée",
        "Arrondi et flare",
        "Freinage et roulage",
        "Manche dans le vent",
        "Frein rotor ON",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_matches_all() {
        let ids: Vec<_> = catalog().map(|def| def.id).collect();
        assert_eq!(ids, ChecklistId::ALL.to_vec());
    }

    #[test]
    fn test_definitions_match_their_id() {
        for id in ChecklistId::ALL {
            assert_eq!(id.definition().id, id);
            assert!(!id.definition().is_empty());
        }
    }

    #[test]
    fn test_prevol_has_seven_steps() {
        assert_eq!(ChecklistId::Prevol.definition().len(), 7);
    }

    #[test]
    fn test_parse_round_trips_as_str() {
        for id in ChecklistId::ALL {
            assert_eq!(id.as_str().parse::<ChecklistId>().unwrap(), id);
            assert_eq!(id.to_string(), id.as_str());
        }
    }

    #[test]
    fn test_parse_unknown() {
        let err = "hover".parse::<ChecklistId>().unwrap_err();
        assert!(matches!(err, Error::UnknownChecklist { ref id } if id == "hover"));
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!("Prevol".parse::<ChecklistId>().is_err());
    }

    #[test]
    fn test_serde_uses_identifier() {
        let json = serde_json::to_string(&ChecklistId::EntreePiste).unwrap();
        assert_eq!(json, "\"entreepiste\"");
        let id: ChecklistId = serde_json::from_str("\"atterrissage\"").unwrap();
        assert_eq!(id, ChecklistId::Atterrissage);
    }

    #[test]
    fn test_fingerprint_is_stable_and_distinct() {
        let prevol = ChecklistId::Prevol.definition();
        assert_eq!(prevol.fingerprint(), prevol.fingerprint());
        assert_ne!(
            prevol.fingerprint(),
            ChecklistId::Roulage.definition().fingerprint()
        );
    }

    #[test]
    fn test_fingerprint_is_boundary_sensitive() {
        let a = fingerprint_steps(["ab", "c"].into_iter());
        let b = fingerprint_steps(["a", "bc"].into_iter());
        assert_ne!(a, b);
    }
}
