//! Motor de Extração Estruturada e Refinamento.
//!
//! - `extract`: monta o prompt (papel de sistema + conhecimento +
//!   contexto upstream + texto de entrada + esquema de saída), chama o
//!   gateway e valida o JSON devolvido contra o esquema do artefato, com
//!   uma tentativa automática de reparo citando os campos ofensores.
//! - `refine_section`: reescreve exatamente uma seção; o resto do
//!   rascunho é preservado byte a byte.
//!
//! O motor nunca persiste: devolve valores novos e o Store decide.

use serde_json::{json, Value};

use licita_domain::{schema_de, ArtifactDraft, ArtifactKind, DomainError};

use crate::config::AppConfig;
use crate::errors::CoreError;
use crate::gateway::{ChatRequest, LlmGateway};

/// Resultado tipado da interpretação de uma resposta de extração.
#[derive(Debug)]
pub enum ExtractionResult {
    Ok(ArtifactDraft),
    /// Objeto JSON válido porém com seções obrigatórias ausentes; vale
    /// uma rodada de reparo citando os campos.
    NeedsRepair { campos: Vec<String> },
    /// Estruturalmente inválido (não é objeto JSON interpretável).
    SchemaViolation { bruto: String },
}

/// Instruções rápidas de refinamento, cada uma mapeada a um texto
/// canônico estável.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstrucaoRapida {
    DetalheTecnico,
    MetricasQuantitativas,
    FundamentacaoLegal,
    MaisObjetivo,
}

impl InstrucaoRapida {
    pub fn texto(&self) -> &'static str {
        match self {
            InstrucaoRapida::DetalheTecnico => {
                "Acrescente detalhamento técnico ao texto, mantendo o conteúdo existente."
            }
            InstrucaoRapida::MetricasQuantitativas => {
                "Acrescente métricas quantitativas (quantidades, prazos, valores) ao texto."
            }
            InstrucaoRapida::FundamentacaoLegal => {
                "Reforce a fundamentação legal com referência à Lei 14.133/2021."
            }
            InstrucaoRapida::MaisObjetivo => {
                "Torne o texto mais objetivo e direto, sem perder informação."
            }
        }
    }

    pub fn todas() -> [InstrucaoRapida; 4] {
        [InstrucaoRapida::DetalheTecnico,
         InstrucaoRapida::MetricasQuantitativas,
         InstrucaoRapida::FundamentacaoLegal,
         InstrucaoRapida::MaisObjetivo]
    }
}

pub struct ExtractionEngine<'g, G: LlmGateway> {
    gateway: &'g G,
    config: &'g AppConfig,
}

impl<'g, G: LlmGateway> ExtractionEngine<'g, G> {
    pub fn new(gateway: &'g G, config: &'g AppConfig) -> Self {
        Self { gateway, config }
    }

    /// Produz um rascunho tipado a partir do texto de entrada e dos
    /// artefatos predecessores. Não persiste.
    pub async fn extract(&self,
                         kind: ArtifactKind,
                         texto: &str,
                         upstream: &[ArtifactDraft],
                         conhecimento: Option<String>)
                         -> Result<ArtifactDraft, CoreError> {
        if texto.trim().is_empty() {
            return Err(CoreError::EntradaVazia);
        }

        let mut req = ChatRequest { sistema: papel_sistema(kind),
                                    conhecimento,
                                    contexto_upstream: contexto_upstream(upstream),
                                    entrada_usuario: texto.to_string(),
                                    schema_saida: Some(schema_saida(kind)) };
        req.aplicar_orcamento(self.config.max_contexto_chars);

        let bruto = self.gateway.completar(req.clone()).await?;
        match interpretar_extracao(kind, &bruto, false) {
            ExtractionResult::Ok(draft) => Ok(self.finalizar(draft)),
            ExtractionResult::NeedsRepair { campos } => {
                self.reparar(kind, req, &campos).await
            }
            ExtractionResult::SchemaViolation { .. } => {
                // Estruturalmente inválido também merece uma rodada de
                // reparo antes de desistir.
                self.reparar(kind, req, &["corpo JSON".to_string()]).await
            }
        }
    }

    /// Segunda (e última) tentativa: cita os campos ofensores no papel de
    /// sistema e interpreta a resposta com leniência (ausentes viram
    /// string vazia).
    async fn reparar(&self,
                     kind: ArtifactKind,
                     req_original: ChatRequest,
                     campos: &[String])
                     -> Result<ArtifactDraft, CoreError> {
        let mut req = req_original;
        req.sistema = format!("{}\n\nATENÇÃO: a resposta anterior veio fora do esquema. Campos \
                               ofensores: {}. Responda novamente com um único objeto JSON com \
                               exatamente as chaves pedidas.",
                              papel_sistema(kind),
                              campos.join(", "));

        let bruto = self.gateway.completar(req).await?;
        match interpretar_extracao(kind, &bruto, true) {
            ExtractionResult::Ok(draft) => Ok(self.finalizar(draft)),
            ExtractionResult::NeedsRepair { campos } => {
                Err(CoreError::SchemaViolation { artefato: kind, campos, bruto })
            }
            ExtractionResult::SchemaViolation { bruto } => {
                Err(CoreError::SchemaViolation { artefato: kind,
                                                 campos: vec!["corpo JSON".to_string()],
                                                 bruto })
            }
        }
    }

    fn finalizar(&self, mut draft: ArtifactDraft) -> ArtifactDraft {
        draft.normalizar();
        draft.recomputar_derivados(&self.config.minimos);
        draft.origem = "extracao".to_string();
        draft
    }

    /// Refina exatamente uma seção segundo a instrução. Demais seções,
    /// campos administrativos e `gaps` alheios permanecem intactos;
    /// `narrativa` e `gaps` são recomputados sobre o novo valor.
    pub async fn refine_section(&self,
                                draft: &ArtifactDraft,
                                secao: &str,
                                instrucao: &str)
                                -> Result<ArtifactDraft, CoreError> {
        let schema = schema_de(draft.artefato);
        if !schema.secoes.contains(&secao) {
            return Err(CoreError::Dominio(DomainError::SecaoDesconhecida {
                artefato: draft.artefato,
                secao: secao.to_string(),
            }));
        }
        let atual = draft.secoes.get(secao).cloned().unwrap_or_default();

        let req = ChatRequest {
            sistema: format!("Você revisa a seção \"{secao}\" de um {} da fase interna de \
                              contratação pública (Lei 14.133/2021). Preserve as informações \
                              existentes; não invente fatos; devolva apenas o corpo refinado da \
                              seção, sem preâmbulo.",
                             draft.artefato.sigla()),
            conhecimento: None,
            contexto_upstream: None,
            entrada_usuario: format!("Texto atual da seção:\n{atual}\n\nInstrução:\n{instrucao}"),
            schema_saida: None,
        };

        let bruto = self.gateway.completar(req).await?;
        let refinado = interpretar_refino(secao, &bruto).ok_or_else(|| {
            CoreError::SchemaViolation { artefato: draft.artefato,
                                         campos: vec![secao.to_string()],
                                         bruto: bruto.clone() }
        })?;

        let mut novo = draft.clone();
        novo.substituir_secao(secao, refinado)?;
        novo.recomputar_derivados(&self.config.minimos);
        novo.atualizado_em = chrono::Utc::now();
        Ok(novo)
    }
}

/// Papel de sistema fixo por tipo de artefato.
pub fn papel_sistema(kind: ArtifactKind) -> String {
    let descricao = match kind {
        ArtifactKind::Dfd => "o Documento de Formalização da Demanda (DFD), que inicia a fase \
                              interna da contratação",
        ArtifactKind::Etp => "o Estudo Técnico Preliminar (ETP), que avalia viabilidade e \
                              alternativas de solução",
        ArtifactKind::Tr => "o Termo de Referência (TR), que define objeto, especificações e \
                             critérios de aceitação",
        ArtifactKind::Edital => "o Edital de licitação, chamamento formal publicado aos \
                                 interessados",
        ArtifactKind::Contrato => "o Contrato administrativo, instrumento legal final",
    };
    format!("Você é um redator técnico de contratações públicas regidas pela Lei 14.133/2021. A \
             partir dos insumos fornecidos, elabore {descricao}. Responda com um único objeto \
             JSON contendo exatamente as chaves pedidas, todas com valor string; use string vazia \
             quando não houver informação. Não invente fatos.")
}

/// Esquema explícito de saída: cada campo administrativo e cada seção do
/// tipo, todos `string`.
pub fn schema_saida(kind: ArtifactKind) -> Value {
    let schema = schema_de(kind);
    let mut obj = serde_json::Map::new();
    for campo in schema.campos {
        obj.insert(campo.to_string(), json!("string"));
    }
    for secao in schema.secoes {
        obj.insert(secao.to_string(), json!("string"));
    }
    Value::Object(obj)
}

/// Contexto dos predecessores, aparado ao essencial: campos
/// administrativos e narrativa consolidada das versões correntes.
pub fn contexto_upstream(upstream: &[ArtifactDraft]) -> Option<String> {
    if upstream.is_empty() {
        return None;
    }
    let mut blocos: Vec<String> = Vec::with_capacity(upstream.len());
    for d in upstream {
        let campos: Vec<String> = d.campos
                                   .iter()
                                   .filter(|(_, v)| !v.trim().is_empty())
                                   .map(|(k, v)| format!("{k}: {v}"))
                                   .collect();
        blocos.push(format!("### {} (v{})\n{}\n{}", d.artefato.sigla(), d.versao,
                            campos.join("\n"), d.narrativa));
    }
    Some(blocos.join("\n\n"))
}

/// Interpreta a resposta de extração. Com `leniente`, seções ausentes
/// viram string vazia (usado na segunda tentativa).
pub fn interpretar_extracao(kind: ArtifactKind, bruto: &str, leniente: bool) -> ExtractionResult {
    let schema = schema_de(kind);
    let texto = remover_cercas(bruto);
    let valor: Value = match serde_json::from_str(texto) {
        Ok(v) => v,
        Err(_) => return ExtractionResult::SchemaViolation { bruto: bruto.to_string() },
    };
    let obj = match valor.as_object() {
        Some(o) => o,
        None => return ExtractionResult::SchemaViolation { bruto: bruto.to_string() },
    };

    if !leniente {
        let ausentes: Vec<String> = schema.secoes
                                          .iter()
                                          .filter(|s| !obj.contains_key(**s))
                                          .map(|s| s.to_string())
                                          .collect();
        if !ausentes.is_empty() {
            return ExtractionResult::NeedsRepair { campos: ausentes };
        }
    }

    let mut draft = ArtifactDraft::vazio(kind);
    for campo in schema.campos {
        if let Some(v) = obj.get(*campo) {
            draft.campos.insert(campo.to_string(), coagir_string(v));
        }
    }
    for secao in schema.secoes {
        if let Some(v) = obj.get(*secao) {
            draft.secoes.insert(secao.to_string(), coagir_string(v));
        }
    }
    // Chaves extras são simplesmente descartadas.
    ExtractionResult::Ok(draft)
}

/// Interpretação robusta da resposta de refinamento: string pura, objeto
/// chaveado pela seção, ou objeto com um único valor string não vazio.
pub fn interpretar_refino(secao: &str, bruto: &str) -> Option<String> {
    let texto = remover_cercas(bruto).trim();
    if texto.is_empty() {
        return None;
    }
    if let Ok(valor) = serde_json::from_str::<Value>(texto) {
        match valor {
            Value::String(s) if !s.trim().is_empty() => return Some(s),
            Value::Object(map) => {
                if let Some(Value::String(s)) = map.get(secao) {
                    if !s.trim().is_empty() {
                        return Some(s.clone());
                    }
                }
                let nao_vazias: Vec<String> = map.values()
                                                 .filter_map(|v| v.as_str())
                                                 .filter(|s| !s.trim().is_empty())
                                                 .map(|s| s.to_string())
                                                 .collect();
                if nao_vazias.len() == 1 {
                    return Some(nao_vazias.into_iter().next().unwrap_or_default());
                }
                return None;
            }
            _ => return None,
        }
    }
    // Não é JSON: trata o payload inteiro como o corpo da seção.
    Some(texto.to_string())
}

/// Valor JSON → string: strings passam direto, nulo vira vazio, o resto é
/// coagido via pretty-print canônico.
fn coagir_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        outro => serde_json::to_string_pretty(outro).unwrap_or_default(),
    }
}

/// Remove cercas de código markdown (```json ... ```), comuns em saídas
/// de modelo.
fn remover_cercas(texto: &str) -> &str {
    let aparado = texto.trim();
    if let Some(resto) = aparado.strip_prefix("```") {
        let sem_rotulo = resto.split_once('\n').map(|(_, corpo)| corpo).unwrap_or(resto);
        if let Some(corpo) = sem_rotulo.strip_suffix("```") {
            return corpo.trim();
        }
    }
    aparado
}
