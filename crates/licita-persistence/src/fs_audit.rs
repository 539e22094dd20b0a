//! Journal de auditoria durável: `auditoria/audit_YYYYMMDD.jsonl`,
//! um objeto JSON por linha, aberto em append e com flush a cada
//! registro. Partições dentro do horizonte nunca são reescritas; o prune
//! remove arquivos-dia inteiros além do horizonte.

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};

use chrono::{Duration, NaiveDate};
use log::warn;

use licita_core::{AuditEvent, AuditLog, CoreError};

use crate::error::PersistenceError;
use crate::layout::ExportLayout;

pub struct FsAuditLog {
    layout: ExportLayout,
}

impl FsAuditLog {
    pub fn new(layout: ExportLayout) -> Result<Self, PersistenceError> {
        fs::create_dir_all(layout.dir_auditoria())?;
        Ok(Self { layout })
    }

    fn dias_existentes(&self) -> Vec<NaiveDate> {
        let leitura = match fs::read_dir(self.layout.dir_auditoria()) {
            Ok(l) => l,
            Err(_) => return Vec::new(),
        };
        let mut dias: Vec<NaiveDate> =
            leitura.filter_map(|e| e.ok())
                   .filter_map(|e| e.file_name().into_string().ok())
                   .filter_map(|nome| {
                       let miolo = nome.strip_prefix("audit_")?.strip_suffix(".jsonl")?;
                       NaiveDate::parse_from_str(miolo, "%Y%m%d").ok()
                   })
                   .collect();
        dias.sort_unstable();
        dias
    }
}

impl AuditLog for FsAuditLog {
    fn append(&mut self, evento: AuditEvent) -> Result<(), CoreError> {
        let caminho = self.layout.arquivo_auditoria(evento.timestamp.date_naive());
        let linha = serde_json::to_string(&evento)
            .map_err(|e| CoreError::Persistencia(e.to_string()))?;
        let mut arquivo = OpenOptions::new().create(true)
                                            .append(true)
                                            .open(&caminho)
                                            .map_err(PersistenceError::from)
                                            .map_err(CoreError::from)?;
        arquivo.write_all(linha.as_bytes()).map_err(PersistenceError::from)
                                           .map_err(CoreError::from)?;
        arquivo.write_all(b"\n").map_err(PersistenceError::from).map_err(CoreError::from)?;
        // Flush antes de retornar: o registro é durável ou o append falha.
        arquivo.flush().map_err(PersistenceError::from).map_err(CoreError::from)?;
        Ok(())
    }

    fn read_range(&self, de: NaiveDate, ate: NaiveDate) -> Result<Vec<AuditEvent>, CoreError> {
        let mut eventos = Vec::new();
        for dia in self.dias_existentes() {
            if dia < de || dia > ate {
                continue;
            }
            let caminho = self.layout.arquivo_auditoria(dia);
            let arquivo = match fs::File::open(&caminho) {
                Ok(a) => a,
                Err(e) => return Err(CoreError::Persistencia(e.to_string())),
            };
            for (n, linha) in BufReader::new(arquivo).lines().enumerate() {
                let linha = linha.map_err(PersistenceError::from).map_err(CoreError::from)?;
                if linha.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<AuditEvent>(&linha) {
                    Ok(ev) => eventos.push(ev),
                    // Linha corrompida é consultiva: avisa e segue.
                    Err(e) => warn!("linha {} ilegível em {}: {e}", n + 1, caminho.display()),
                }
            }
        }
        Ok(eventos)
    }

    fn prune(&mut self, horizonte_dias: u32, hoje: NaiveDate) -> Result<usize, CoreError> {
        let limite = hoje - Duration::days(horizonte_dias as i64);
        let mut removidos = 0usize;
        for dia in self.dias_existentes() {
            if dia < limite {
                fs::remove_file(self.layout.arquivo_auditoria(dia))
                    .map_err(PersistenceError::from)
                    .map_err(CoreError::from)?;
                removidos += 1;
            }
        }
        Ok(removidos)
    }
}
