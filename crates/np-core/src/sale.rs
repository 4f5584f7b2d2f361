//! Sales records as served by the backend.
//!
//! The backend speaks in legacy column names (`CODFIL60`, `NUMDOC60`, ...)
//! and is loose about numbers vs strings, so the field mapping lives here
//! and the rest of the workspace uses plain Rust names.

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Loose {
    fn into_string(self) -> String {
        match self {
            Loose::Text(s) => s,
            Loose::Int(n) => n.to_string(),
            Loose::Float(f) => f.to_string(),
            Loose::Bool(b) => b.to_string(),
        }
    }
}

fn loose_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<Loose>::deserialize(d)?
        .map(Loose::into_string)
        .unwrap_or_default())
}

fn loose_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Loose>::deserialize(d)?.map(Loose::into_string))
}

fn loose_amount<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Option::<Loose>::deserialize(d)? {
        None => Ok(0.0),
        Some(Loose::Int(n)) => Ok(n as f64),
        Some(Loose::Float(f)) => Ok(f),
        Some(Loose::Text(s)) => s
            .trim()
            .replace(',', ".")
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount {s:?}"))),
        Some(Loose::Bool(_)) => Err(serde::de::Error::custom("amount cannot be a boolean")),
    }
}

fn loose_flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Option::<Loose>::deserialize(d)? {
        None => false,
        Some(Loose::Bool(b)) => b,
        Some(Loose::Int(n)) => n != 0,
        Some(Loose::Float(f)) => f != 0.0,
        Some(Loose::Text(s)) => matches!(s.trim(), "1" | "true" | "S" | "s"),
    })
}

/// One sale (`conrec` row).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Sale {
    #[serde(default, deserialize_with = "loose_opt_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "CODFIL60", default, deserialize_with = "loose_string")]
    pub branch: String,
    #[serde(rename = "CODCLI60", default, deserialize_with = "loose_string")]
    pub customer: String,
    #[serde(rename = "NCAIXA60", default, deserialize_with = "loose_string")]
    pub terminal: String,
    #[serde(rename = "NUMDOC60", default, deserialize_with = "loose_string")]
    pub document: String,
    #[serde(rename = "CUPOM60", default, deserialize_with = "loose_opt_string")]
    pub receipt: Option<String>,
    #[serde(rename = "LANSAI60", default, deserialize_with = "loose_opt_string")]
    pub entry: Option<String>,
    #[serde(rename = "NOME60", default, deserialize_with = "loose_string")]
    pub customer_name: String,
    #[serde(rename = "VALOR60", default, deserialize_with = "loose_amount")]
    pub amount: f64,
    #[serde(rename = "DATEMIS60", default, deserialize_with = "loose_string")]
    pub issued_at: String,
    #[serde(rename = "DATVENC60", default, deserialize_with = "loose_string")]
    pub due_at: String,
    #[serde(rename = "NOTAPROMIS", default, deserialize_with = "loose_flag")]
    pub signed: bool,
}

impl Sale {
    /// Name under which the signed note is stored on the backend.
    pub fn signed_filename(&self) -> String {
        format!(
            "{}_{}_{}_{}.png",
            self.branch, self.customer, self.terminal, self.document
        )
    }

    /// Identifier the upload is attached to: the record `id`, falling back
    /// to the ledger entry number.
    pub fn record_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.entry.as_deref())
    }

    /// Payload asking the backend to generate this sale's promissory note.
    pub fn promissory_request(&self) -> PromissoryRequest {
        PromissoryRequest {
            valor: self.amount,
            codcli: self.customer.clone(),
            filial: self.branch.clone(),
            datavenc: self.due_at.clone(),
            numero_cupom: self.document.clone(),
            data_compra: self.issued_at.clone(),
            data_emissao: self.issued_at.clone(),
        }
    }
}

/// Body of `POST /docs/nota-promissoria`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromissoryRequest {
    pub valor: f64,
    pub codcli: String,
    pub filial: String,
    pub datavenc: String,
    pub numero_cupom: String,
    pub data_compra: String,
    pub data_emissao: String,
}

/// Search criteria for `GET /conrec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleFilter {
    pub branch: Option<String>,
    pub terminal: Option<String>,
    pub customer: Option<String>,
    pub document: Option<String>,
    pub signed_only: bool,
    pub limit: u32,
}

impl Default for SaleFilter {
    fn default() -> Self {
        Self {
            branch: None,
            terminal: None,
            customer: None,
            document: None,
            signed_only: false,
            limit: 10,
        }
    }
}

impl SaleFilter {
    /// Most recent sale at a branch/terminal.
    pub fn latest(branch: &str, terminal: &str) -> Self {
        Self {
            branch: Some(branch.to_string()),
            terminal: Some(terminal.to_string()),
            limit: 1,
            ..Self::default()
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::with_capacity(6);
        let fields = [
            ("filial", &self.branch),
            ("pdv", &self.terminal),
            ("codigocliente", &self.customer),
            ("documento", &self.document),
        ];
        for (key, value) in fields {
            if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                q.push((key, v.to_string()));
            }
        }
        q.push(("verifica_promissoria", self.signed_only.to_string()));
        q.push(("qtd", self.limit.max(1).to_string()));
        q
    }
}

/// `cadcli` row, used to pick a customer for filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    #[serde(rename = "CODCLI10", deserialize_with = "loose_string")]
    pub code: String,
    #[serde(rename = "RAZSOC10", default, deserialize_with = "loose_string")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ROW: &str = r#"{
        "id": 981,
        "CODFIL60": 1,
        "CODCLI60": 4521,
        "NCAIXA60": "3",
        "NUMDOC60": 77810,
        "CUPOM60": 77810,
        "LANSAI60": 55012,
        "NOME60": "MARIA DA SILVA",
        "VALOR60": "149.90",
        "DATEMIS60": "2024-03-07T10:15:00",
        "DATVENC60": "2024-04-07",
        "NOTAPROMIS": null,
        "EXTRA": "ignored"
    }"#;

    #[test]
    fn decodes_loose_backend_row() {
        let sale: Sale = serde_json::from_str(ROW).unwrap();
        assert_eq!(sale.id.as_deref(), Some("981"));
        assert_eq!(sale.branch, "1");
        assert_eq!(sale.terminal, "3");
        assert_eq!(sale.amount, 149.90);
        assert!(!sale.signed);
        assert_eq!(sale.record_id(), Some("981"));
    }

    #[test]
    fn signed_filename_joins_identifiers() {
        let sale: Sale = serde_json::from_str(ROW).unwrap();
        assert_eq!(sale.signed_filename(), "1_4521_3_77810.png");
    }

    #[test]
    fn record_id_falls_back_to_entry() {
        let sale = Sale {
            entry: Some("55012".into()),
            ..Sale::default()
        };
        assert_eq!(sale.record_id(), Some("55012"));
        assert_eq!(Sale::default().record_id(), None);
    }

    #[test]
    fn promissory_request_uses_issue_date_twice() {
        let sale: Sale = serde_json::from_str(ROW).unwrap();
        let req = sale.promissory_request();
        assert_eq!(req.data_compra, req.data_emissao);
        assert_eq!(req.numero_cupom, "77810");
        assert_eq!(req.valor, 149.90);
    }

    #[test]
    fn filter_query_skips_blank_fields() {
        let filter = SaleFilter {
            branch: Some("1".into()),
            customer: Some("  ".into()),
            signed_only: true,
            ..SaleFilter::default()
        };
        assert_eq!(
            filter.query_pairs(),
            vec![
                ("filial", "1".to_string()),
                ("verifica_promissoria", "true".to_string()),
                ("qtd", "10".to_string()),
            ]
        );
        assert_eq!(SaleFilter::latest("1", "3").query_pairs().last().unwrap().1, "1");
    }

    #[test]
    fn flag_accepts_numbers_and_text() {
        let sale: Sale = serde_json::from_str(r#"{"NOTAPROMIS": 1}"#).unwrap();
        assert!(sale.signed);
        let sale: Sale = serde_json::from_str(r#"{"NOTAPROMIS": "S"}"#).unwrap();
        assert!(sale.signed);
    }
}
