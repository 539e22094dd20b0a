//! Agregador somente-leitura de textos institucionais de referência.
//!
//! Falhas de leitura são absorvidas com aviso: conhecimento é insumo
//! consultivo, nunca bloqueia o fluxo.

use std::fs;
use std::path::PathBuf;

use log::warn;

pub struct KnowledgeLoader {
    dir: Option<PathBuf>,
}

impl KnowledgeLoader {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Concatena os textos do diretório (ordenados por nome de arquivo,
    /// nunca pela ordem do listing) até o orçamento de caracteres.
    /// Diretório ausente ou vazio devolve `None`.
    pub fn carregar(&self, max_chars: usize) -> Option<String> {
        let dir = self.dir.as_ref()?;
        let leitura = match fs::read_dir(dir) {
            Ok(l) => l,
            Err(e) => {
                warn!("base de conhecimento ilegível em {}: {e}", dir.display());
                return None;
            }
        };

        let mut arquivos: Vec<PathBuf> = leitura.filter_map(|e| e.ok())
                                                .map(|e| e.path())
                                                .filter(|p| {
                                                    matches!(p.extension().and_then(|x| x.to_str()),
                                                             Some("txt") | Some("md"))
                                                })
                                                .collect();
        arquivos.sort();

        let mut bloco = String::new();
        for caminho in arquivos {
            let conteudo = match fs::read_to_string(&caminho) {
                Ok(c) => c,
                Err(e) => {
                    warn!("ignorando {}: {e}", caminho.display());
                    continue;
                }
            };
            let nome = caminho.file_stem().and_then(|n| n.to_str()).unwrap_or("referencia");
            bloco.push_str(&format!("## {nome}\n{}\n\n", conteudo.trim()));
            if bloco.chars().count() >= max_chars {
                break;
            }
        }

        if bloco.is_empty() {
            return None;
        }
        if bloco.chars().count() > max_chars {
            bloco = bloco.chars().take(max_chars).collect();
        }
        Some(bloco)
    }
}
