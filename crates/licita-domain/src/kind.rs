//! Tipos de artefato e a ordem fixa da jornada de contratação.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Os cinco artefatos da fase interna, na ordem de dependência.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Dfd,
    Etp,
    Tr,
    Edital,
    Contrato,
}

/// Ordem canônica da jornada. Toda iteração sobre tipos usa esta
/// constante; nunca a ordem de inserção de mapas.
pub const ORDEM: [ArtifactKind; 5] = [ArtifactKind::Dfd,
                                      ArtifactKind::Etp,
                                      ArtifactKind::Tr,
                                      ArtifactKind::Edital,
                                      ArtifactKind::Contrato];

impl ArtifactKind {
    /// Identificador estável em minúsculas (usado em caminhos de arquivo).
    pub fn slug(&self) -> &'static str {
        match self {
            ArtifactKind::Dfd => "dfd",
            ArtifactKind::Etp => "etp",
            ArtifactKind::Tr => "tr",
            ArtifactKind::Edital => "edital",
            ArtifactKind::Contrato => "contrato",
        }
    }

    /// Sigla em maiúsculas para mensagens e relatórios.
    pub fn sigla(&self) -> &'static str {
        match self {
            ArtifactKind::Dfd => "DFD",
            ArtifactKind::Etp => "ETP",
            ArtifactKind::Tr => "TR",
            ArtifactKind::Edital => "EDITAL",
            ArtifactKind::Contrato => "CONTRATO",
        }
    }

    /// Posição na ordem canônica (0 = DFD).
    pub fn posicao(&self) -> usize {
        ORDEM.iter().position(|k| k == self).unwrap_or(0)
    }

    /// Artefato imediatamente anterior, se houver.
    pub fn predecessor(&self) -> Option<ArtifactKind> {
        let i = self.posicao();
        if i == 0 { None } else { Some(ORDEM[i - 1]) }
    }

    /// Todos os predecessores, na ordem canônica.
    pub fn predecessores(&self) -> &'static [ArtifactKind] {
        &ORDEM[..self.posicao()]
    }

    /// Artefato seguinte na jornada, se houver.
    pub fn sucessor(&self) -> Option<ArtifactKind> {
        let i = self.posicao();
        ORDEM.get(i + 1).copied()
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sigla())
    }
}

impl FromStr for ArtifactKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dfd" => Ok(ArtifactKind::Dfd),
            "etp" => Ok(ArtifactKind::Etp),
            "tr" => Ok(ArtifactKind::Tr),
            "edital" => Ok(ArtifactKind::Edital),
            "contrato" => Ok(ArtifactKind::Contrato),
            outro => Err(DomainError::ArtefatoInvalido(outro.to_string())),
        }
    }
}
