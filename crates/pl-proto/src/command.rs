use pl_core::Label;

/// Commande entrante (hôte → device), une ligne ASCII par commande.
///
/// Tout ce qui n'est pas reconnu devient `Unknown` : la boucle répond
/// `ERROR:unknown_command` et continue, jamais de crash sur entrée
/// malformée.
///
/// # Example
/// ```
/// use pl_proto::Command;
/// use pl_core::Label;
/// assert_eq!(Command::parse("LABEL:elephant\r\n"), Command::Label(Label::Rumble));
/// assert!(matches!(Command::parse("EXPLODE"), Command::Unknown(_)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Étiquette le dernier vecteur de features extrait.
    Label(Label),
    /// Flush immédiat du dataset vers le stockage.
    SaveData,
    /// Vide le training set.
    ClearData,
    /// Demande les statistiques du dataset.
    GetDataset,
    /// Demande un STATUS immédiat.
    GetStatus,
    /// Demande la dernière ligne FEATURES.
    GetFeatures,
    /// Demande le dump complet du dataset.
    DumpDataset,
    /// Test de vie.
    Ping,
    /// Verbe non reconnu (conservé pour les logs).
    Unknown(String),
}

impl Command {
    /// Parse une ligne de commande. Tolère espaces et `\r` de fin.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Some(token) = line.strip_prefix("LABEL:") {
            return match Label::from_token(token.trim()) {
                Some(label) => Self::Label(label),
                None => Self::Unknown(line.to_string()),
            };
        }
        match line {
            "SAVE_DATA" => Self::SaveData,
            "CLEAR_DATA" => Self::ClearData,
            "GET_DATASET" => Self::GetDataset,
            "GET_STATUS" => Self::GetStatus,
            "GET_FEATURES" => Self::GetFeatures,
            "DUMP_DATASET" => Self::DumpDataset,
            "PING" => Self::Ping,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_commands_carry_the_class() {
        assert_eq!(Command::parse("LABEL:elephant"), Command::Label(Label::Rumble));
        assert_eq!(
            Command::parse("LABEL:not_elephant"),
            Command::Label(Label::NoRumble)
        );
    }

    #[test]
    fn crlf_and_whitespace_are_tolerated() {
        assert_eq!(Command::parse("  SAVE_DATA\r\n"), Command::SaveData);
        assert_eq!(Command::parse("LABEL: elephant \r"), Command::Label(Label::Rumble));
    }

    #[test]
    fn unknown_verbs_are_preserved() {
        match Command::parse("SELF_DESTRUCT:now") {
            Command::Unknown(raw) => assert_eq!(raw, "SELF_DESTRUCT:now"),
            other => panic!("expected Unknown, got {other:?}"),
        }
        assert!(matches!(Command::parse("LABEL:mammoth"), Command::Unknown(_)));
        assert!(matches!(Command::parse(""), Command::Unknown(_)));
    }

    #[test]
    fn all_verbs_parse() {
        for (line, expected) in [
            ("CLEAR_DATA", Command::ClearData),
            ("GET_DATASET", Command::GetDataset),
            ("GET_STATUS", Command::GetStatus),
            ("GET_FEATURES", Command::GetFeatures),
            ("DUMP_DATASET", Command::DumpDataset),
            ("PING", Command::Ping),
        ] {
            assert_eq!(Command::parse(line), expected);
        }
    }
}
