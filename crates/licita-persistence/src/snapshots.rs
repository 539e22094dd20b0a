//! Fotografias de métricas e relatórios exportados.
//!
//! Observacional: falha aqui não afeta a correção do fluxo, mas é
//! devolvida ao chamador para registro.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use licita_core::analytics::{snapshot_csv, Snapshot};
use licita_domain::ArtifactKind;

use crate::error::PersistenceError;
use crate::fs_store::gravar_atomico;
use crate::layout::ExportLayout;

/// Grava a fotografia em JSON + CSV sob `analises/`; devolve os caminhos.
pub fn gravar_snapshot(layout: &ExportLayout,
                       snapshot: &Snapshot)
                       -> Result<(PathBuf, PathBuf), PersistenceError> {
    let carimbo = snapshot.gerado_em.format("%Y%m%d%H%M%S");
    let json_path = layout.dir_analises().join(format!("analise_{carimbo}.json"));
    let csv_path = layout.dir_analises().join(format!("analise_{carimbo}.csv"));

    let corpo = serde_json::to_string_pretty(snapshot)
        .map_err(|e| PersistenceError::Io(e.to_string()))? + "\n";
    gravar_atomico(&json_path, &corpo)?;
    gravar_atomico(&csv_path, &snapshot_csv(snapshot))?;
    Ok((json_path, csv_path))
}

/// Grava o relatório markdown de um artefato sob `relatorios/`.
/// A renderização .docx é colaborador externo; o markdown é o insumo.
pub fn gravar_relatorio_markdown(layout: &ExportLayout,
                                 kind: ArtifactKind,
                                 markdown: &str,
                                 agora: DateTime<Utc>)
                                 -> Result<PathBuf, PersistenceError> {
    let caminho = layout.dir_relatorios()
                        .join(format!("{}_{}.md", kind.slug(), agora.format("%Y%m%d%H%M%S")));
    gravar_atomico(&caminho, markdown)?;
    Ok(caminho)
}
