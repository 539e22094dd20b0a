//! Artifact Store durável sobre o sistema de arquivos.
//!
//! Cada `put` grava a versão nova em `versoes/<tipo>/v{N}.json` e então
//! substitui `<tipo>_data.json` — ambas as gravações via arquivo
//! temporário + rename, de modo que uma queda no meio nunca deixa estado
//! parcial visível. Escritores do mesmo tipo são serializados pelo
//! `&mut self` do contrato.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::error;
use tempfile::NamedTempFile;

use licita_core::store::preparar_para_gravar;
use licita_core::{ArtifactStore, CoreError};
use licita_domain::{ArtifactDraft, ArtifactKind, MinimosSecao};

use crate::error::PersistenceError;
use crate::layout::ExportLayout;

pub struct FsArtifactStore {
    layout: ExportLayout,
    minimos: MinimosSecao,
}

impl FsArtifactStore {
    pub fn new(layout: ExportLayout, minimos: MinimosSecao) -> Result<Self, PersistenceError> {
        layout.criar_dirs()?;
        Ok(Self { layout, minimos })
    }

    fn ler_rascunho(&self, caminho: &Path) -> Result<ArtifactDraft, PersistenceError> {
        let conteudo = fs::read_to_string(caminho).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PersistenceError::NaoEncontrado(caminho.display().to_string())
            } else {
                PersistenceError::Io(e.to_string())
            }
        })?;
        serde_json::from_str(&conteudo).map_err(|e| PersistenceError::Corrupto {
            caminho: caminho.display().to_string(),
            motivo: e.to_string(),
        })
    }
}

/// Gravação atômica: escreve num temporário no mesmo diretório e faz
/// rename sobre o destino.
pub(crate) fn gravar_atomico(destino: &Path, conteudo: &str) -> Result<(), PersistenceError> {
    let dir = destino.parent()
                     .ok_or_else(|| PersistenceError::Io("destino sem diretório".to_string()))?;
    fs::create_dir_all(dir)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(conteudo.as_bytes())?;
    tmp.flush()?;
    tmp.persist(destino).map_err(|e| PersistenceError::Io(e.to_string()))?;
    Ok(())
}

impl ArtifactStore for FsArtifactStore {
    fn put(&mut self, kind: ArtifactKind, draft: ArtifactDraft, origem: &str)
           -> Result<u32, CoreError> {
        let versao = self.list_versions(kind).last().copied().unwrap_or(0) + 1;
        let pronto = preparar_para_gravar(kind, draft, origem, versao, &self.minimos)?;

        // JSON canônico de gravação: UTF-8, pretty estável, terminado em LF.
        let corpo = serde_json::to_string_pretty(&pronto)
            .map_err(|e| CoreError::Persistencia(e.to_string()))? + "\n";

        gravar_atomico(&self.layout.arquivo_versao(kind, versao), &corpo)
            .map_err(CoreError::from)?;
        gravar_atomico(&self.layout.dados_corrente(kind), &corpo).map_err(CoreError::from)?;
        Ok(versao)
    }

    fn get_current(&self, kind: ArtifactKind) -> Option<ArtifactDraft> {
        match self.ler_rascunho(&self.layout.dados_corrente(kind)) {
            Ok(d) => Some(d),
            Err(PersistenceError::NaoEncontrado(_)) => None,
            Err(e) => {
                error!("rascunho corrente ilegível para {kind}: {e}");
                None
            }
        }
    }

    fn get_version(&self, kind: ArtifactKind, versao: u32) -> Result<ArtifactDraft, CoreError> {
        match self.ler_rascunho(&self.layout.arquivo_versao(kind, versao)) {
            Ok(d) => Ok(d),
            Err(PersistenceError::NaoEncontrado(_)) => {
                Err(CoreError::NotFound { artefato: kind, versao: Some(versao) })
            }
            Err(e) => Err(CoreError::from(e)),
        }
    }

    fn list_versions(&self, kind: ArtifactKind) -> Vec<u32> {
        let dir = self.layout.dir_versoes(kind);
        let leitura = match fs::read_dir(&dir) {
            Ok(l) => l,
            Err(_) => return Vec::new(),
        };
        let mut versoes: Vec<u32> =
            leitura.filter_map(|e| e.ok())
                   .filter_map(|e| e.file_name().into_string().ok())
                   .filter_map(|nome| {
                       nome.strip_prefix('v')?.strip_suffix(".json")?.parse().ok()
                   })
                   .collect();
        // Ordenação explícita: nunca confiar na ordem do listing.
        versoes.sort_unstable();
        versoes
    }
}
