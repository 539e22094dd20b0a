//! Layout persistido sob `exports/`:
//!
//! - `<tipo>_data.json` — rascunho corrente por tipo (JSON canônico, UTF-8, LF).
//! - `versoes/<tipo>/v{N}.json` — histórico imutável de versões.
//! - `auditoria/audit_YYYYMMDD.jsonl` — journal, um objeto por linha.
//! - `analises/` — fotografias de métricas (JSON + CSV).
//! - `logs/` — registros operacionais legíveis (informativo).
//! - `relatorios/` — documentos renderizados (somente saída).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use licita_domain::ArtifactKind;

#[derive(Debug, Clone)]
pub struct ExportLayout {
    raiz: PathBuf,
}

impl ExportLayout {
    pub fn new<P: Into<PathBuf>>(raiz: P) -> Self {
        Self { raiz: raiz.into() }
    }

    pub fn raiz(&self) -> &Path {
        &self.raiz
    }

    pub fn dados_corrente(&self, kind: ArtifactKind) -> PathBuf {
        self.raiz.join(format!("{}_data.json", kind.slug()))
    }

    pub fn dir_versoes(&self, kind: ArtifactKind) -> PathBuf {
        self.raiz.join("versoes").join(kind.slug())
    }

    pub fn arquivo_versao(&self, kind: ArtifactKind, versao: u32) -> PathBuf {
        self.dir_versoes(kind).join(format!("v{versao}.json"))
    }

    pub fn dir_auditoria(&self) -> PathBuf {
        self.raiz.join("auditoria")
    }

    pub fn arquivo_auditoria(&self, dia: NaiveDate) -> PathBuf {
        self.dir_auditoria().join(format!("audit_{}.jsonl", dia.format("%Y%m%d")))
    }

    pub fn dir_analises(&self) -> PathBuf {
        self.raiz.join("analises")
    }

    pub fn dir_logs(&self) -> PathBuf {
        self.raiz.join("logs")
    }

    pub fn dir_relatorios(&self) -> PathBuf {
        self.raiz.join("relatorios")
    }

    /// Garante a árvore de diretórios do layout.
    pub fn criar_dirs(&self) -> io::Result<()> {
        for dir in [self.raiz.clone(),
                    self.raiz.join("versoes"),
                    self.dir_auditoria(),
                    self.dir_analises(),
                    self.dir_logs(),
                    self.dir_relatorios()]
        {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}
