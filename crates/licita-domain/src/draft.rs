//! Rascunho tipado de um artefato (`ArtifactDraft`).
//!
//! O rascunho é um valor: o motor de extração produz um novo valor, o
//! refinamento produz outro valor, e só o Artifact Store decide aceitar.
//! Derivados (`narrativa`, `gaps`) são funções puras das seções e podem
//! ser recomputados a qualquer momento sem perda de informação.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::DomainError;
use crate::kind::ArtifactKind;
use crate::schema::schema_de;

/// Comprimento mínimo de seção (pós-trim) para o check rígido e o cálculo
/// de `gaps`. Externalizado como política; o padrão vale para todos os
/// tipos salvo override.
#[derive(Debug, Clone)]
pub struct MinimosSecao {
    pub padrao: usize,
    pub por_artefato: HashMap<ArtifactKind, usize>,
}

impl Default for MinimosSecao {
    fn default() -> Self {
        Self { padrao: 30, por_artefato: HashMap::new() }
    }
}

impl MinimosSecao {
    pub fn com_padrao(padrao: usize) -> Self {
        Self { padrao, por_artefato: HashMap::new() }
    }

    pub fn minimo(&self, kind: ArtifactKind) -> usize {
        self.por_artefato.get(&kind).copied().unwrap_or(self.padrao)
    }
}

/// Instância tipada de um artefato da jornada.
///
/// `secoes` mantém a ordem do esquema (IndexMap); `campos` são os campos
/// administrativos simples. `versao`, timestamps e `content_hash` são
/// metadados voláteis: ficam fora do hash canônico.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactDraft {
    pub artefato: ArtifactKind,
    #[serde(default)]
    pub versao: u32,
    pub campos: IndexMap<String, String>,
    pub secoes: IndexMap<String, String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    #[serde(default)]
    pub narrativa: String,
    #[serde(default)]
    pub origem: String,
    pub criado_em: DateTime<Utc>,
    pub atualizado_em: DateTime<Utc>,
    #[serde(default)]
    pub content_hash: String,
}

impl ArtifactDraft {
    /// Rascunho vazio conforme o esquema: todas as seções e campos
    /// declarados presentes com string vazia.
    pub fn vazio(kind: ArtifactKind) -> Self {
        let schema = schema_de(kind);
        let agora = Utc::now();
        Self { artefato: kind,
               versao: 0,
               campos: schema.campos.iter().map(|c| (c.to_string(), String::new())).collect(),
               secoes: schema.secoes.iter().map(|s| (s.to_string(), String::new())).collect(),
               gaps: Vec::new(),
               narrativa: String::new(),
               origem: String::new(),
               criado_em: agora,
               atualizado_em: agora,
               content_hash: String::new() }
    }

    /// Normaliza o rascunho contra o esquema: preenche seções/campos
    /// ausentes com vazio, descarta chaves desconhecidas, reordena na
    /// ordem do esquema e limpa o texto (CRLF → LF, sem espaço à direita).
    pub fn normalizar(&mut self) {
        let schema = schema_de(self.artefato);
        let mut secoes = IndexMap::with_capacity(schema.secoes.len());
        for nome in schema.secoes {
            let valor = self.secoes.get(*nome).map(|v| limpar_texto(v)).unwrap_or_default();
            secoes.insert(nome.to_string(), valor);
        }
        self.secoes = secoes;

        let mut campos = IndexMap::with_capacity(schema.campos.len());
        for nome in schema.campos {
            let valor = self.campos.get(*nome).map(|v| limpar_texto(v)).unwrap_or_default();
            campos.insert(nome.to_string(), valor);
        }
        self.campos = campos;
    }

    /// Verifica conformidade estrita com o esquema:
    /// exatamente as chaves declaradas, na ordem declarada.
    pub fn conforme(&self) -> Result<(), DomainError> {
        let schema = schema_de(self.artefato);
        let mut divergentes: Vec<String> = Vec::new();

        let chaves: Vec<&str> = self.secoes.keys().map(|k| k.as_str()).collect();
        if chaves != schema.secoes {
            for nome in schema.secoes {
                if !self.secoes.contains_key(*nome) {
                    divergentes.push(format!("secao ausente: {nome}"));
                }
            }
            for chave in self.secoes.keys() {
                if !schema.secoes.contains(&chave.as_str()) {
                    divergentes.push(format!("secao desconhecida: {chave}"));
                }
            }
            if divergentes.is_empty() {
                divergentes.push("secoes fora da ordem do esquema".to_string());
            }
        }

        for nome in schema.campos {
            if !self.campos.contains_key(*nome) {
                divergentes.push(format!("campo ausente: {nome}"));
            }
        }
        for chave in self.campos.keys() {
            if !schema.campos.contains(&chave.as_str()) {
                divergentes.push(format!("campo desconhecido: {chave}"));
            }
        }

        if divergentes.is_empty() {
            Ok(())
        } else {
            Err(DomainError::EsquemaViolado { artefato: self.artefato, campos: divergentes })
        }
    }

    /// Recomputa `narrativa` e `gaps` a partir das seções.
    ///
    /// - `narrativa`: concatenação numerada das seções não vazias, na
    ///   ordem do esquema.
    /// - `gaps`: seções cujo texto (pós-trim) fica abaixo do mínimo.
    pub fn recomputar_derivados(&mut self, minimos: &MinimosSecao) {
        let schema = schema_de(self.artefato);
        let minimo = minimos.minimo(self.artefato);

        let mut partes: Vec<String> = Vec::new();
        let mut gaps: Vec<String> = Vec::new();
        let mut n = 0usize;
        for nome in schema.secoes {
            let texto = self.secoes.get(*nome).map(|s| s.trim()).unwrap_or("");
            if !texto.is_empty() {
                n += 1;
                partes.push(format!("{n}. {nome}\n{texto}"));
            }
            if texto.chars().count() < minimo {
                gaps.push(nome.to_string());
            }
        }
        self.narrativa = partes.join("\n\n");
        self.gaps = gaps;
    }

    /// Substitui uma única seção, preservando todo o resto byte a byte;
    /// derivados são recomputados pelo chamador.
    pub fn substituir_secao(&mut self, secao: &str, texto: String) -> Result<(), DomainError> {
        match self.secoes.get_mut(secao) {
            Some(v) => {
                *v = limpar_texto(&texto);
                Ok(())
            }
            None => Err(DomainError::SecaoDesconhecida { artefato: self.artefato,
                                                         secao: secao.to_string() }),
        }
    }

    /// Corpo canônico para hashing: o valor serializado sem os metadados
    /// voláteis (`versao`, timestamps, `content_hash`).
    pub fn valor_canonico(&self) -> Value {
        let mut v = serde_json::to_value(self).unwrap_or(Value::Null);
        if let Value::Object(map) = &mut v {
            map.remove("versao");
            map.remove("criado_em");
            map.remove("atualizado_em");
            map.remove("content_hash");
        }
        v
    }

    /// Contagem de palavras da narrativa consolidada (métrica de auditoria).
    pub fn palavras(&self) -> usize {
        self.narrativa.split_whitespace().count()
    }

    /// Contagem de caracteres da narrativa consolidada.
    pub fn caracteres(&self) -> usize {
        self.narrativa.chars().count()
    }
}

/// Normalização textual: CRLF → LF, remove espaço à direita de cada linha
/// e linhas vazias finais.
fn limpar_texto(texto: &str) -> String {
    let unificado = texto.replace("\r\n", "\n").replace('\r', "\n");
    let linhas: Vec<&str> = unificado.lines().map(|l| l.trim_end()).collect();
    linhas.join("\n").trim_end().to_string()
}
