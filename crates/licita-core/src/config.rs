//! Configuração da aplicação a partir de variáveis de ambiente (.env).
//!
//! Sem `OPENAI_API_KEY` os recursos de IA degradam para
//! `ModelUnavailable`; check rígido, store e auditoria seguem operando.

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use licita_domain::MinimosSecao;

// Carga preguiçosa do .env, uma única vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora ausência do arquivo
});

/// Força a carga do .env a partir de aplicações externas, se desejado.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Credencial do modelo; `None` desabilita IA graciosamente.
    pub openai_api_key: Option<String>,
    /// Token opcional do espelho de versionamento (colaborador externo).
    pub github_token: Option<String>,
    pub modelo: String,
    /// Orçamento de caracteres do contexto (conhecimento + upstream).
    pub max_contexto_chars: usize,
    /// Tentativas em erro transiente do gateway.
    pub tentativas: u32,
    pub timeout_secs: u64,
    /// Horizonte de retenção da auditoria, em dias.
    pub retencao_dias: u32,
    /// Política de comprimento mínimo por seção (check rígido e gaps).
    pub minimos: MinimosSecao,
    /// Dias sem atualização a partir dos quais um rascunho é alertado.
    pub stale_dias: i64,
    /// Raiz do layout persistido (`exports/`).
    pub exports_dir: PathBuf,
    /// Diretório da base de conhecimento institucional (somente leitura).
    pub base_conhecimento: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { openai_api_key: None,
               github_token: None,
               modelo: "gpt-4o-mini".to_string(),
               max_contexto_chars: 12_000,
               tentativas: 3,
               timeout_secs: 60,
               retencao_dias: 90,
               minimos: MinimosSecao::default(),
               stale_dias: 15,
               exports_dir: PathBuf::from("exports"),
               base_conhecimento: None }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        let padrao = Self::default();
        Self { openai_api_key: env::var("OPENAI_API_KEY").ok().filter(|v| !v.trim().is_empty()),
               github_token: env::var("GITHUB_TOKEN").ok().filter(|v| !v.trim().is_empty()),
               modelo: env::var("LICITA_MODELO").unwrap_or(padrao.modelo),
               max_contexto_chars: var_parse("LICITA_MAX_CONTEXTO", padrao.max_contexto_chars),
               tentativas: var_parse("LICITA_TENTATIVAS", padrao.tentativas),
               timeout_secs: var_parse("LICITA_TIMEOUT_SECS", padrao.timeout_secs),
               retencao_dias: var_parse("LICITA_RETENCAO_DIAS", padrao.retencao_dias),
               minimos: MinimosSecao::com_padrao(var_parse("LICITA_MIN_SECAO", 30)),
               stale_dias: var_parse("LICITA_STALE_DIAS", padrao.stale_dias),
               exports_dir: env::var("LICITA_EXPORTS_DIR").map(PathBuf::from)
                                                          .unwrap_or(padrao.exports_dir),
               base_conhecimento: env::var("LICITA_BASE_CONHECIMENTO").ok().map(PathBuf::from) }
    }
}

fn var_parse<T: std::str::FromStr>(nome: &str, padrao: T) -> T {
    env::var(nome).ok().and_then(|v| v.parse().ok()).unwrap_or(padrao)
}
