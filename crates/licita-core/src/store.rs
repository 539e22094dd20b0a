//! Artifact Store: dono exclusivo dos rascunhos persistidos.
//!
//! Append-only por tipo: cada `put` canonicaliza, valida contra o
//! esquema, calcula o hash de conteúdo e grava uma nova versão
//! (monotônica). Leitores recebem cópias; mudanças só entram via `put`.

use std::collections::HashMap;

use chrono::Utc;

use licita_domain::{ArtifactDraft, ArtifactKind, DomainError, MinimosSecao};

use crate::errors::CoreError;
use crate::hashing::hash_value;

pub trait ArtifactStore {
    /// Canonicaliza e grava o rascunho como a próxima versão do tipo.
    /// Falha com violação de esquema sem gravar nada.
    fn put(&mut self, kind: ArtifactKind, draft: ArtifactDraft, origem: &str)
           -> Result<u32, CoreError>;

    /// Versão corrente do tipo (a última aceita), se houver.
    fn get_current(&self, kind: ArtifactKind) -> Option<ArtifactDraft>;

    /// Versão específica; `NotFound` se inexistente.
    fn get_version(&self, kind: ArtifactKind, versao: u32) -> Result<ArtifactDraft, CoreError>;

    /// Versões existentes do tipo, em ordem crescente.
    fn list_versions(&self, kind: ArtifactKind) -> Vec<u32>;
}

/// Canonicalização compartilhada entre implementações: normaliza contra o
/// esquema, valida, recomputa derivados, sela hash/versão/origem.
/// `atualizado_em` só avança quando o hash de conteúdo muda.
pub fn preparar_para_gravar(kind: ArtifactKind,
                            mut draft: ArtifactDraft,
                            origem: &str,
                            versao: u32,
                            minimos: &MinimosSecao)
                            -> Result<ArtifactDraft, CoreError> {
    if draft.artefato != kind {
        return Err(CoreError::Dominio(DomainError::EsquemaViolado {
            artefato: kind,
            campos: vec![format!("tipo divergente: {}", draft.artefato)],
        }));
    }
    draft.normalizar();
    draft.conforme()?;
    draft.recomputar_derivados(minimos);
    draft.origem = origem.to_string();

    let hash = hash_value(&draft.valor_canonico());
    if hash != draft.content_hash {
        draft.atualizado_em = Utc::now();
    }
    draft.content_hash = hash;
    draft.versao = versao;
    Ok(draft)
}

/// Store em memória: vetor de versões por tipo, versão 1-based.
pub struct InMemoryArtifactStore {
    versoes: HashMap<ArtifactKind, Vec<ArtifactDraft>>,
    minimos: MinimosSecao,
}

impl InMemoryArtifactStore {
    pub fn new(minimos: MinimosSecao) -> Self {
        Self { versoes: HashMap::new(), minimos }
    }
}

impl Default for InMemoryArtifactStore {
    fn default() -> Self {
        Self::new(MinimosSecao::default())
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn put(&mut self, kind: ArtifactKind, draft: ArtifactDraft, origem: &str)
           -> Result<u32, CoreError> {
        let fila = self.versoes.entry(kind).or_default();
        let versao = fila.len() as u32 + 1;
        let pronto = preparar_para_gravar(kind, draft, origem, versao, &self.minimos)?;
        fila.push(pronto);
        Ok(versao)
    }

    fn get_current(&self, kind: ArtifactKind) -> Option<ArtifactDraft> {
        self.versoes.get(&kind).and_then(|v| v.last()).cloned()
    }

    fn get_version(&self, kind: ArtifactKind, versao: u32) -> Result<ArtifactDraft, CoreError> {
        self.versoes
            .get(&kind)
            .and_then(|v| v.iter().find(|d| d.versao == versao))
            .cloned()
            .ok_or(CoreError::NotFound { artefato: kind, versao: Some(versao) })
    }

    fn list_versions(&self, kind: ArtifactKind) -> Vec<u32> {
        let mut versoes: Vec<u32> =
            self.versoes.get(&kind).map(|v| v.iter().map(|d| d.versao).collect()).unwrap_or_default();
        versoes.sort_unstable();
        versoes
    }
}
