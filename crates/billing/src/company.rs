use serde::{Deserialize, Serialize};

/// Shop identity printed in the bill header and footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub name: String,
    #[serde(default)]
    pub address_lines: Vec<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub gst_id: Option<String>,
    #[serde(default = "default_terms")]
    pub terms: Vec<String>,
    #[serde(default = "default_closing")]
    pub closing: String,
}

fn default_terms() -> Vec<String> {
    vec![
        "Goods once sold will not be taken back or exchanged.".to_string(),
        "All disputes are subject to local jurisdiction only.".to_string(),
    ]
}

fn default_closing() -> String {
    "Thank you for your business!".to_string()
}

impl Default for CompanyProfile {
    fn default() -> Self {
        Self {
            name: "My Store".to_string(),
            address_lines: Vec::new(),
            phone: None,
            email: None,
            gst_id: None,
            terms: default_terms(),
            closing: default_closing(),
        }
    }
}
