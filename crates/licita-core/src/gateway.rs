//! Ponto único de acesso ao modelo de linguagem.
//!
//! Todo o resto do sistema fala com o modelo exclusivamente por este
//! trait. O orçamento de contexto é aplicado aqui, antes de qualquer
//! transporte: corta primeiro o bloco de conhecimento, depois o contexto
//! de artefatos anteriores; a entrada do usuário nunca é truncada.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Requisição determinista ao modelo: partes nomeadas, montadas pelo
/// provedor no formato chat-completions.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// Papel de sistema fixo por operação/tipo de artefato.
    pub sistema: String,
    /// Bloco de conhecimento institucional (limitado; primeiro a ceder).
    pub conhecimento: Option<String>,
    /// Contexto dos artefatos predecessores (segundo a ceder).
    pub contexto_upstream: Option<String>,
    /// Carga do usuário; nunca truncada.
    pub entrada_usuario: String,
    /// Esquema JSON de saída quando a chamada é de extração; `None` para
    /// refinamento e avaliação semântica (texto livre).
    pub schema_saida: Option<Value>,
}

impl ChatRequest {
    /// Total de caracteres das partes textuais sujeitas a orçamento.
    pub fn chars_total(&self) -> usize {
        self.sistema.chars().count()
        + self.conhecimento.as_deref().map(|s| s.chars().count()).unwrap_or(0)
        + self.contexto_upstream.as_deref().map(|s| s.chars().count()).unwrap_or(0)
        + self.entrada_usuario.chars().count()
    }

    /// Degrada a requisição para caber em `max_chars`: conhecimento
    /// primeiro, depois contexto upstream. Sistema e entrada do usuário
    /// ficam intactos mesmo que o total continue acima do orçamento.
    pub fn aplicar_orcamento(&mut self, max_chars: usize) {
        let mut excesso = self.chars_total().saturating_sub(max_chars);
        if excesso == 0 {
            return;
        }
        for parte in [&mut self.conhecimento, &mut self.contexto_upstream] {
            if excesso == 0 {
                break;
            }
            if let Some(texto) = parte.as_mut() {
                let len = texto.chars().count();
                let corte = excesso.min(len);
                *texto = truncar_chars(texto, len - corte);
                excesso -= corte;
                if texto.is_empty() {
                    *parte = None;
                }
            }
        }
    }
}

/// Corta uma string em limite de caractere (não de byte).
fn truncar_chars(s: &str, manter: usize) -> String {
    s.chars().take(manter).collect()
}

/// Falhas expostas pelo gateway. Transiente é tratado dentro do provedor
/// (retry com backoff); o que chega aqui já é terminal para a chamada.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GatewayError {
    #[error("transporte: {0}")]
    Transport(String),
    #[error("modelo indisponível: {0}")]
    ModelUnavailable(String),
    #[error("saída fora do esquema")]
    SchemaViolation { bruto: String },
    #[error("tempo esgotado")]
    Timeout,
    #[error("cancelado")]
    Cancelled,
}

/// Único chamador do modelo externo.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    async fn completar(&self, req: ChatRequest) -> Result<String, GatewayError>;
}

/// Gateway roteirizado para testes: devolve respostas pré-programadas em
/// ordem e registra cada requisição recebida.
pub struct MockGateway {
    respostas: Mutex<VecDeque<Result<String, GatewayError>>>,
    chamadas: Mutex<Vec<ChatRequest>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self { respostas: Mutex::new(VecDeque::new()), chamadas: Mutex::new(Vec::new()) }
    }

    pub fn com_respostas<I>(respostas: I) -> Self
        where I: IntoIterator<Item = Result<String, GatewayError>>
    {
        let g = Self::new();
        g.respostas.lock().expect("lock respostas").extend(respostas);
        g
    }

    pub fn empilhar(&self, resposta: Result<String, GatewayError>) {
        self.respostas.lock().expect("lock respostas").push_back(resposta);
    }

    /// Requisições recebidas até aqui (cópia).
    pub fn chamadas(&self) -> Vec<ChatRequest> {
        self.chamadas.lock().expect("lock chamadas").clone()
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn completar(&self, req: ChatRequest) -> Result<String, GatewayError> {
        self.chamadas.lock().expect("lock chamadas").push(req);
        self.respostas
            .lock()
            .expect("lock respostas")
            .pop_front()
            .unwrap_or(Err(GatewayError::ModelUnavailable("roteiro esgotado".to_string())))
    }
}
