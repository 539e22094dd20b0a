//! Motor de Validação: check rígido (determinista) + check semântico
//! (assistido pelo modelo, tolerante a saída malformada).

use chrono::{DateTime, Utc};
use log::warn;
use serde::Serialize;
use serde_json::{json, Value};

use licita_domain::{schema_de, ArtifactDraft, ArtifactKind, MinimosSecao};

use crate::config::AppConfig;
use crate::errors::CoreError;
use crate::gateway::{ChatRequest, LlmGateway};

/// Presença de um campo exigido pelo esquema.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RigidItem {
    pub campo: String,
    pub presente: bool,
}

/// Relatório do check rígido: score 0–100 e um booleano por campo.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RigidReport {
    pub score: u8,
    pub itens: Vec<RigidItem>,
}

impl RigidReport {
    pub fn completo(&self) -> bool {
        self.score == 100
    }

    /// Campos reprovados, na ordem do esquema.
    pub fn faltantes(&self) -> Vec<String> {
        self.itens.iter().filter(|i| !i.presente).map(|i| i.campo.clone()).collect()
    }
}

/// Check rígido: puro e determinista, sem chamada de modelo.
///
/// Campos administrativos contam como presentes quando não vazios; seções
/// exigem o comprimento mínimo da política (a mesma usada em `gaps`, o
/// que torna `score == 100 ⇒ gaps == []` estrutural).
pub fn rigid_check(draft: &ArtifactDraft, minimos: &MinimosSecao) -> RigidReport {
    let schema = schema_de(draft.artefato);
    let minimo = minimos.minimo(draft.artefato);
    let mut itens = Vec::with_capacity(schema.campos.len() + schema.secoes.len());

    for campo in schema.campos {
        let presente = draft.campos.get(*campo).map(|v| !v.trim().is_empty()).unwrap_or(false);
        itens.push(RigidItem { campo: campo.to_string(), presente });
    }
    for secao in schema.secoes {
        let presente = draft.secoes
                            .get(*secao)
                            .map(|v| v.trim().chars().count() >= minimo)
                            .unwrap_or(false);
        itens.push(RigidItem { campo: secao.to_string(), presente });
    }

    let presentes = itens.iter().filter(|i| i.presente).count();
    let score = if itens.is_empty() { 100 } else { (100 * presentes / itens.len()) as u8 };
    RigidReport { score, itens }
}

/// Avaliação semântica do modelo.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SemanticReport {
    pub score: u8,
    pub recomendacoes: Vec<String>,
    /// Rascunho reescrito "guiado", quando o modelo o oferece.
    pub guided_markdown: Option<String>,
}

/// O check semântico pode degradar sem bloquear o fluxo.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum SemanticOutcome {
    Avaliado(SemanticReport),
    /// Parse impossível mesmo com leniência; texto cru anexado.
    Indisponivel { bruto: String },
}

/// Relatório completo de uma rodada de validação. Nunca é mutado.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub rigido: RigidReport,
    pub semantico: Option<SemanticOutcome>,
    pub avaliado_em: DateTime<Utc>,
}

/// Rodada completa de validação: check rígido sempre; semântico quando há
/// gateway disponível. Falha do semântico é consultiva e deixa o campo
/// vazio; o rígido decide.
pub async fn validate<G: LlmGateway>(gateway: Option<&G>,
                                     config: &AppConfig,
                                     draft: &ArtifactDraft)
                                     -> ValidationReport {
    let rigido = rigid_check(draft, &config.minimos);
    let semantico = match gateway {
        Some(g) => match semantic_check(g, config, draft).await {
            Ok(saida) => Some(saida),
            Err(e) => {
                warn!("check semântico indisponível para {}: {e}", draft.artefato);
                None
            }
        },
        None => None,
    };
    ValidationReport { rigido, semantico, avaliado_em: Utc::now() }
}

/// Rubrica de adequação específica do tipo.
fn rubrica(kind: ArtifactKind) -> &'static str {
    match kind {
        ArtifactKind::Dfd => "clareza da necessidade, alinhamento institucional, justificativa \
                              legal e riscos da não contratação",
        ArtifactKind::Etp => "qualidade do levantamento de mercado, comparação de soluções e \
                              fundamentação da escolha",
        ArtifactKind::Tr => "precisão do objeto, especificação técnica verificável e critérios \
                             de julgamento objetivos",
        ArtifactKind::Edital => "completude das condições de participação, habilitação e \
                                 obrigações das partes",
        ArtifactKind::Contrato => "cobertura das cláusulas obrigatórias e coerência com o edital",
    }
}

/// Check semântico via gateway: uma chamada, saída esperada
/// `{score, recomendacoes, guided_markdown?}`, parse leniente em cima.
pub async fn semantic_check<G: LlmGateway>(gateway: &G,
                                           config: &AppConfig,
                                           draft: &ArtifactDraft)
                                           -> Result<SemanticOutcome, CoreError> {
    let mut req = ChatRequest {
        sistema: format!("Você avalia a adequação de um {} segundo a Lei 14.133/2021. Critérios: \
                          {}. Responda em JSON: {{\"score\": inteiro 0-100, \"recomendacoes\": \
                          [strings], \"guided_markdown\": string opcional com o texto reescrito}}.",
                         draft.artefato.sigla(),
                         rubrica(draft.artefato)),
        conhecimento: None,
        contexto_upstream: None,
        entrada_usuario: draft.narrativa.clone(),
        schema_saida: Some(json!({"score": "int", "recomendacoes": ["string"],
                                  "guided_markdown": "string?"})),
    };
    req.aplicar_orcamento(config.max_contexto_chars);

    let bruto = gateway.completar(req).await?;
    Ok(interpretar_semantico(&bruto))
}

/// Parse leniente da resposta semântica: primeiro JSON estrito, depois
/// varredura por inteiro (score) e lista de bullets (recomendações).
pub fn interpretar_semantico(bruto: &str) -> SemanticOutcome {
    let texto = bruto.trim();

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(texto) {
        if let Some(score) = map.get("score").and_then(valor_inteiro) {
            let recomendacoes = map.get("recomendacoes")
                                   .or_else(|| map.get("recommendations"))
                                   .and_then(|v| v.as_array())
                                   .map(|arr| {
                                       arr.iter()
                                          .filter_map(|v| v.as_str())
                                          .map(|s| s.to_string())
                                          .collect()
                                   })
                                   .unwrap_or_default();
            let guided = map.get("guided_markdown")
                            .and_then(|v| v.as_str())
                            .filter(|s| !s.trim().is_empty())
                            .map(|s| s.to_string());
            return SemanticOutcome::Avaliado(SemanticReport { score: clampar(score),
                                                              recomendacoes,
                                                              guided_markdown: guided });
        }
    }

    // Leniência: extrai o primeiro inteiro plausível e quebra bullets.
    if let Some(score) = primeiro_inteiro(texto) {
        let recomendacoes = texto.lines()
                                 .map(|l| l.trim())
                                 .filter_map(|l| {
                                     l.strip_prefix("- ")
                                      .or_else(|| l.strip_prefix("* "))
                                      .or_else(|| l.strip_prefix("• "))
                                 })
                                 .map(|s| s.to_string())
                                 .collect();
        return SemanticOutcome::Avaliado(SemanticReport { score: clampar(score),
                                                          recomendacoes,
                                                          guided_markdown: None });
    }

    SemanticOutcome::Indisponivel { bruto: bruto.to_string() }
}

fn valor_inteiro(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn primeiro_inteiro(texto: &str) -> Option<i64> {
    let mut atual = String::new();
    for c in texto.chars() {
        if c.is_ascii_digit() {
            atual.push(c);
        } else if !atual.is_empty() {
            break;
        }
    }
    atual.parse().ok().filter(|n| (0..=100).contains(n))
}

fn clampar(n: i64) -> u8 {
    n.clamp(0, 100) as u8
}
