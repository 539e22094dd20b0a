//! Gateway OpenAI (chat-completions).
//!
//! Monta as partes nomeadas da `ChatRequest` como mensagens de chat,
//! pede `response_format: json_object` quando a chamada declara esquema
//! de saída e faz retry com backoff exponencial apenas em falha
//! transiente (conexão, 429, 5xx). O timeout cobre a requisição inteira,
//! da conexão até o fim da leitura do corpo. Violação de esquema nunca é
//! re-tentada aqui; o reparo é decisão do motor de extração.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::json;

use licita_core::{AppConfig, ChatRequest, GatewayError, LlmGateway};

const API_URL: &str = "https://api.openai.com/v1/chat/completions";
const BACKOFF_BASE_MS: u64 = 500;

pub struct OpenAiGateway {
    client: reqwest::Client,
    url: String,
    api_key: String,
    modelo: String,
    tentativas: u32,
    timeout_secs: u64,
}

#[derive(Serialize)]
struct Mensagem<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct RespostaChat {
    choices: Vec<Escolha>,
}

#[derive(Deserialize)]
struct Escolha {
    message: MensagemSaida,
}

#[derive(Deserialize)]
struct MensagemSaida {
    content: Option<String>,
}

impl OpenAiGateway {
    pub fn new(api_key: String, modelo: String, tentativas: u32, timeout_secs: u64) -> Self {
        Self { client: reqwest::Client::new(),
               url: API_URL.to_string(),
               api_key,
               modelo,
               tentativas: tentativas.max(1),
               timeout_secs }
    }

    /// Constrói a partir da configuração; `None` sem credencial (o
    /// chamador degrada para operação sem IA).
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        config.openai_api_key.as_ref().map(|chave| {
                                          Self::new(chave.clone(),
                                                    config.modelo.clone(),
                                                    config.tentativas,
                                                    config.timeout_secs)
                                      })
    }

    fn mensagens<'a>(req: &'a ChatRequest) -> Vec<Mensagem<'a>> {
        let mut mensagens = vec![Mensagem { role: "system", content: &req.sistema }];
        if let Some(conhecimento) = req.conhecimento.as_deref() {
            mensagens.push(Mensagem { role: "system", content: conhecimento });
        }
        if let Some(upstream) = req.contexto_upstream.as_deref() {
            mensagens.push(Mensagem { role: "system", content: upstream });
        }
        mensagens.push(Mensagem { role: "user", content: &req.entrada_usuario });
        mensagens
    }

    async fn chamar_uma_vez(&self, req: &ChatRequest) -> Result<String, GatewayError> {
        let mut corpo = json!({
            "model": self.modelo,
            "messages": Self::mensagens(req),
            "temperature": 0.2,
        });
        if req.schema_saida.is_some() {
            corpo["response_format"] = json!({ "type": "json_object" });
        }

        // Timeout no builder: vale da conexão ao fim do corpo, não só
        // até os cabeçalhos.
        let resposta = self.client
                           .post(&self.url)
                           .bearer_auth(&self.api_key)
                           .timeout(Duration::from_secs(self.timeout_secs))
                           .json(&corpo)
                           .send()
                           .await
                           .map_err(mapear_erro)?;

        let status = resposta.status();
        if !status.is_success() {
            let corpo = resposta.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 429 || status.is_server_error() {
                           GatewayError::Transport(format!("http {status}: {corpo}"))
                       } else {
                           GatewayError::ModelUnavailable(format!("http {status}: {corpo}"))
                       });
        }

        let parsed: RespostaChat = resposta.json().await.map_err(mapear_erro)?;
        parsed.choices
              .into_iter()
              .next()
              .and_then(|c| c.message.content)
              .ok_or_else(|| GatewayError::ModelUnavailable("resposta sem conteúdo".to_string()))
    }
}

fn mapear_erro(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else if e.is_connect() {
        GatewayError::ModelUnavailable(format!("conexão recusada: {e}"))
    } else {
        GatewayError::Transport(e.to_string())
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn completar(&self, req: ChatRequest) -> Result<String, GatewayError> {
        let mut ultimo = GatewayError::ModelUnavailable("sem tentativa".to_string());
        for tentativa in 0..self.tentativas {
            if tentativa > 0 {
                let espera = BACKOFF_BASE_MS * (1 << (tentativa - 1).min(6));
                warn!("gateway: tentativa {}/{} após {}ms ({ultimo})",
                      tentativa + 1,
                      self.tentativas,
                      espera);
                tokio::time::sleep(Duration::from_millis(espera)).await;
            }
            match self.chamar_uma_vez(&req).await {
                Ok(texto) => return Ok(texto),
                // Só transporte e timeout são transientes.
                Err(e @ (GatewayError::Transport(_) | GatewayError::Timeout)) => ultimo = e,
                Err(e) => return Err(e),
            }
        }
        Err(ultimo)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn req_minima(schema: bool) -> ChatRequest {
        ChatRequest { sistema: "papel".to_string(),
                      conhecimento: Some("base".to_string()),
                      contexto_upstream: None,
                      entrada_usuario: "pedido".to_string(),
                      schema_saida: schema.then(|| json!({"type": "object"})) }
    }

    #[test]
    fn mensagens_seguem_a_ordem_sistema_conhecimento_usuario() {
        let req = req_minima(false);
        let msgs = OpenAiGateway::mensagens(&req);
        let papeis: Vec<&str> = msgs.iter().map(|m| m.role).collect();
        assert_eq!(papeis, vec!["system", "system", "user"]);
        assert_eq!(msgs.last().map(|m| m.content), Some("pedido"));
    }

    #[test]
    fn from_config_exige_credencial() {
        let config = AppConfig::default();
        assert!(OpenAiGateway::from_config(&config).is_none());

        let mut com_chave = AppConfig::default();
        com_chave.openai_api_key = Some("sk-teste".to_string());
        assert!(OpenAiGateway::from_config(&com_chave).is_some());
    }

    fn gateway_para(url: &str, tentativas: u32, timeout_secs: u64) -> OpenAiGateway {
        OpenAiGateway { url: url.to_string(),
                        ..OpenAiGateway::new("sk-teste".to_string(),
                                             "modelo-teste".to_string(),
                                             tentativas,
                                             timeout_secs) }
    }

    fn resposta_http(status: &str, corpo: &str) -> String {
        format!("HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
                 Content-Length: {}\r\nConnection: close\r\n\r\n{corpo}",
                corpo.len())
    }

    /// Consome cabeçalhos e corpo da requisição antes de responder.
    fn ler_requisicao(stream: &mut TcpStream) {
        let mut cabecalho = Vec::new();
        let mut byte = [0u8; 1];
        while !cabecalho.ends_with(b"\r\n\r\n") {
            match stream.read(&mut byte) {
                Ok(n) if n > 0 => cabecalho.push(byte[0]),
                _ => return,
            }
        }
        let texto = String::from_utf8_lossy(&cabecalho);
        let tamanho: usize = texto.lines()
                                  .filter_map(|l| {
                                      let (nome, valor) = l.split_once(':')?;
                                      nome.eq_ignore_ascii_case("content-length")
                                          .then(|| valor.trim().parse().ok())?
                                  })
                                  .next()
                                  .unwrap_or(0);
        let mut corpo = vec![0u8; tamanho];
        let _ = stream.read_exact(&mut corpo);
    }

    /// Servidor de uma thread que serve as respostas na ordem dada,
    /// uma conexão por resposta, contando as chamadas atendidas.
    fn servidor_roteirizado(respostas: Vec<String>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let chamadas = Arc::new(AtomicUsize::new(0));
        let contador = Arc::clone(&chamadas);
        std::thread::spawn(move || {
            for resposta in respostas {
                let Ok((mut stream, _)) = listener.accept() else { return };
                ler_requisicao(&mut stream);
                contador.fetch_add(1, Ordering::SeqCst);
                let _ = stream.write_all(resposta.as_bytes());
            }
        });
        (url, chamadas)
    }

    #[tokio::test]
    async fn refaz_apos_5xx_e_devolve_a_resposta_boa() {
        let boa = json!({"choices": [{"message": {"content": "texto final"}}]});
        let (url, chamadas) =
            servidor_roteirizado(vec![resposta_http("500 Internal Server Error", "{}"),
                                      resposta_http("200 OK", &boa.to_string())]);
        let gateway = gateway_para(&url, 2, 5);

        let saida = gateway.completar(req_minima(false)).await.unwrap();
        assert_eq!(saida, "texto final");
        assert_eq!(chamadas.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn erro_de_cliente_nao_e_retentado() {
        let (url, chamadas) =
            servidor_roteirizado(vec![resposta_http("400 Bad Request",
                                                    "{\"error\": \"pedido malformado\"}")]);
        let gateway = gateway_para(&url, 3, 5);

        let erro = gateway.completar(req_minima(false)).await.unwrap_err();
        assert!(matches!(erro, GatewayError::ModelUnavailable(_)), "veio {erro}");
        assert_eq!(chamadas.load(Ordering::SeqCst), 1, "4xx não é transiente");
    }

    #[tokio::test]
    async fn corpo_que_trava_estoura_o_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        std::thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else { return };
            ler_requisicao(&mut stream);
            // Cabeçalhos completos e corpo parcial: a leitura trava.
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                                       Content-Length: 1000\r\n\r\n{\"choices\":");
            std::thread::sleep(Duration::from_secs(5));
        });
        let gateway = gateway_para(&url, 1, 1);

        let erro = gateway.completar(req_minima(false)).await.unwrap_err();
        assert!(matches!(erro, GatewayError::Timeout), "veio {erro}");
    }
}
