//! Coerência entre artefatos adjacentes.
//!
//! Para cada par (DFD,ETP), (ETP,TR), (TR,EDITAL), (EDITAL,CONTRATO)
//! compara um conjunto pequeno de âncoras (objeto, valor estimado,
//! prazo, fonte de recursos, responsável) por presença e por
//! similaridade normalizada de tokens.

use serde::Serialize;
use std::collections::BTreeSet;

use licita_domain::{ArtifactDraft, ArtifactKind};

use crate::store::ArtifactStore;

/// Pares adjacentes da jornada, na ordem canônica.
fn pares_adjacentes() -> impl Iterator<Item = (ArtifactKind, ArtifactKind)> {
    licita_domain::kind::ORDEM.windows(2).map(|w| (w[0], w[1])).collect::<Vec<_>>().into_iter()
}

/// Limiar de similaridade acordado provisoriamente com o domínio.
pub const LIMIAR_SIMILARIDADE: f64 = 0.35;

/// Âncoras que devem permanecer consistentes ao longo da jornada.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Ancora {
    Objeto,
    ValorEstimado,
    Prazo,
    FonteRecursos,
    Responsavel,
}

pub const ANCORAS: [Ancora; 5] =
    [Ancora::Objeto, Ancora::ValorEstimado, Ancora::Prazo, Ancora::FonteRecursos, Ancora::Responsavel];

impl Ancora {
    pub fn nome(&self) -> &'static str {
        match self {
            Ancora::Objeto => "objeto",
            Ancora::ValorEstimado => "valor_estimado",
            Ancora::Prazo => "prazo",
            Ancora::FonteRecursos => "fonte_recursos",
            Ancora::Responsavel => "responsavel",
        }
    }
}

/// Resolve o valor da âncora no rascunho, conforme o tipo. `None` quando
/// a âncora não se aplica ao tipo.
pub fn valor_ancora(ancora: Ancora, draft: &ArtifactDraft) -> Option<String> {
    let campo = |nome: &str| draft.campos.get(nome).cloned();
    let secao = |nome: &str| draft.secoes.get(nome).cloned();
    match (ancora, draft.artefato) {
        (Ancora::Objeto, ArtifactKind::Dfd) => secao("Objetivos da Contratação"),
        (Ancora::Objeto, ArtifactKind::Etp) => secao("Descrição da Necessidade"),
        (Ancora::Objeto, ArtifactKind::Tr) | (Ancora::Objeto, ArtifactKind::Edital) => {
            secao("Objeto")
        }
        (Ancora::Objeto, ArtifactKind::Contrato) => campo("objeto"),

        (Ancora::ValorEstimado, ArtifactKind::Contrato) => campo("valor"),
        (Ancora::ValorEstimado, _) => campo("valor_estimado"),

        (Ancora::Prazo, ArtifactKind::Tr) => {
            campo("prazo").filter(|v| !v.trim().is_empty()).or_else(|| secao("Prazo de Execução"))
        }
        (Ancora::Prazo, ArtifactKind::Edital) => {
            campo("prazo").filter(|v| !v.trim().is_empty()).or_else(|| secao("Prazo de Execução"))
        }
        (Ancora::Prazo, _) => campo("prazo"),

        (Ancora::FonteRecursos, ArtifactKind::Tr) => secao("Fonte de Recursos"),
        (Ancora::FonteRecursos, ArtifactKind::Edital) => secao("Fontes de Recursos"),
        (Ancora::FonteRecursos, _) => None,

        (Ancora::Responsavel, ArtifactKind::Contrato) => campo("contratante"),
        (Ancora::Responsavel, _) => campo("responsavel"),
    }
}

/// Situação de uma âncora em um par de artefatos.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SituacaoAncora {
    Coincide,
    Diverge,
    /// Ao menos um dos lados vazio; não entra no score do par.
    Ausente,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ComparacaoAncora {
    pub ancora: Ancora,
    pub similaridade: f64,
    pub situacao: SituacaoAncora,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ParCoerencia {
    pub de: ArtifactKind,
    pub para: ArtifactKind,
    pub ancoras: Vec<ComparacaoAncora>,
    /// 100 × coincidentes / comparáveis (100 quando nada comparável).
    pub score: u8,
}

/// Varredura completa, regenerada sob demanda.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoherenceReport {
    pub pares: Vec<ParCoerencia>,
    pub score_consolidado: u8,
    /// Descrições legíveis de cada divergência encontrada.
    pub discrepancias: Vec<String>,
}

/// Similaridade de Jaccard sobre conjuntos de tokens alfanuméricos em
/// minúsculas. 1.0 para textos idênticos pós-normalização.
pub fn similaridade(a: &str, b: &str) -> f64 {
    let ta = tokens(a);
    let tb = tokens(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    let intersecao = ta.intersection(&tb).count();
    let uniao = ta.union(&tb).count();
    if uniao == 0 { 0.0 } else { intersecao as f64 / uniao as f64 }
}

fn tokens(texto: &str) -> BTreeSet<String> {
    texto.to_lowercase()
         .split(|c: char| !c.is_alphanumeric())
         .filter(|t| !t.is_empty())
         .map(|t| t.to_string())
         .collect()
}

fn comparar_par(a: &ArtifactDraft, b: &ArtifactDraft) -> ParCoerencia {
    let mut ancoras = Vec::new();
    let mut coincidentes = 0usize;
    let mut comparaveis = 0usize;

    for ancora in ANCORAS {
        let va = valor_ancora(ancora, a);
        let vb = valor_ancora(ancora, b);
        let (va, vb) = match (va, vb) {
            (Some(x), Some(y)) => (x, y),
            _ => continue, // âncora não se aplica a um dos tipos
        };
        if va.trim().is_empty() || vb.trim().is_empty() {
            ancoras.push(ComparacaoAncora { ancora, similaridade: 0.0,
                                            situacao: SituacaoAncora::Ausente });
            continue;
        }
        let sim = similaridade(&va, &vb);
        comparaveis += 1;
        let situacao = if sim >= LIMIAR_SIMILARIDADE {
            coincidentes += 1;
            SituacaoAncora::Coincide
        } else {
            SituacaoAncora::Diverge
        };
        ancoras.push(ComparacaoAncora { ancora, similaridade: sim, situacao });
    }

    let score = if comparaveis == 0 { 100 } else { (100 * coincidentes / comparaveis) as u8 };
    ParCoerencia { de: a.artefato, para: b.artefato, ancoras, score }
}

/// Varre os pares adjacentes cujas versões correntes existem no store.
pub fn coherence_scan<S: ArtifactStore + ?Sized>(store: &S) -> CoherenceReport {
    let mut pares = Vec::new();
    let mut discrepancias = Vec::new();

    for (de, para) in pares_adjacentes() {
        let (a, b) = match (store.get_current(de), store.get_current(para)) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        let par = comparar_par(&a, &b);
        for cmp in &par.ancoras {
            if cmp.situacao == SituacaoAncora::Diverge {
                discrepancias.push(format!("{}→{}: âncora '{}' diverge (similaridade {:.2})",
                                           de.sigla(), para.sigla(), cmp.ancora.nome(),
                                           cmp.similaridade));
            }
        }
        pares.push(par);
    }

    let score_consolidado = if pares.is_empty() {
        100
    } else {
        (pares.iter().map(|p| p.score as usize).sum::<usize>() / pares.len()) as u8
    };
    CoherenceReport { pares, score_consolidado, discrepancias }
}
