//! Exportação do rascunho como markdown e contratos dos colaboradores
//! externos (renderização de documento e espelho de versionamento ficam
//! fora do core; aqui só as interfaces).

use std::path::Path;

use licita_domain::ArtifactDraft;

use crate::errors::CoreError;

/// Documento markdown do rascunho: cabeçalho administrativo + narrativa.
pub fn markdown_do_rascunho(draft: &ArtifactDraft) -> String {
    let mut doc = format!("# {} — versão {}\n\n", draft.artefato.sigla(), draft.versao);
    for (campo, valor) in &draft.campos {
        if !valor.trim().is_empty() {
            doc.push_str(&format!("- **{campo}**: {valor}\n"));
        }
    }
    doc.push('\n');
    doc.push_str(&draft.narrativa);
    doc.push('\n');
    if !draft.gaps.is_empty() {
        doc.push_str("\n## Lacunas identificadas\n");
        for gap in &draft.gaps {
            doc.push_str(&format!("- {gap}\n"));
        }
    }
    doc
}

/// Renderizador de documento final (.docx). Implementado fora do core;
/// consome `{markdown, caminho_saida}`.
pub trait DocumentRenderer {
    fn render(&self, markdown: &str, caminho_saida: &Path) -> Result<(), CoreError>;
}

/// Espelho remoto de versionamento. Fire-and-forget: falhas são apenas
/// registradas pelo implementador.
pub trait VcsMirror {
    fn espelhar(&self, caminho: &str, conteudo: &str, mensagem: &str);
}
