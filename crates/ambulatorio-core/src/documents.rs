//! Downloadable document templates.

use serde::Serialize;

use crate::models::{Category, Site};

/// A printable template offered to staff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub file_type: &'static str,
    pub url: &'static str,
}

static CATALOG: &[DocumentTemplate] = &[
    DocumentTemplate {
        id: "consent_med",
        name: "Consenso Informato MED",
        category: Category::Med,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_f548c735-b113-437f-82ec-c0afbf122c8d/artifacts/k3jcaxa4_CONSENSO_INFORMATO.pdf",
    },
    DocumentTemplate {
        id: "scheda_mmg",
        name: "Scheda MMG",
        category: Category::Med,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_f548c735-b113-437f-82ec-c0afbf122c8d/artifacts/8bonfflf_SCHEDA_MMG.pdf",
    },
    DocumentTemplate {
        id: "anagrafica_med",
        name: "Anagrafica/Anamnesi MED",
        category: Category::Med,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_f548c735-b113-437f-82ec-c0afbf122c8d/artifacts/txx60tb0_anagrafica%20med.jpg",
    },
    DocumentTemplate {
        id: "scheda_medicazione_med",
        name: "Scheda Medicazione MED",
        category: Category::Med,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_f548c735-b113-437f-82ec-c0afbf122c8d/artifacts/nzkb51vc_medicazione%20med.jpg",
    },
    DocumentTemplate {
        id: "consent_picc_1",
        name: "Consenso Generico Processi Clinico-Assistenziali",
        category: Category::Picc,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_medhub-38/artifacts/ysusww7f_CONSENSO%20GENERICO%20AI%20PROCESSI%20CLINICO.ASSISTENZIALI%20ORDINARI%201.pdf",
    },
    DocumentTemplate {
        id: "consent_picc_2",
        name: "Consenso Informato PICC e Midline",
        category: Category::Picc,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_medhub-38/artifacts/siz46bgw_CONSENSO%20INFORMATO%20PICC%20E%20MIDLINE.pdf",
    },
    DocumentTemplate {
        id: "brochure_picc_port",
        name: "Brochure PICC Port",
        category: Category::Picc,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_medhub-38/artifacts/cein282q_Picc%20Port.pdf",
    },
    DocumentTemplate {
        id: "brochure_picc",
        name: "Brochure PICC",
        category: Category::Picc,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_medhub-38/artifacts/kk882djy_Picc.pdf",
    },
    DocumentTemplate {
        id: "scheda_impianto_picc",
        name: "Scheda Impianto e Gestione AV",
        category: Category::Picc,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_medhub-38/artifacts/sbw1iws9_Sch%20Impianto%20Gestione%20AV%20NEW.pdf",
    },
    DocumentTemplate {
        id: "specifiche_impianto_picc",
        name: "Specifiche Impianto",
        category: Category::Picc,
        file_type: "pdf",
        url: "https://customer-assets.emergentagent.com/job_medhub-38/artifacts/03keycn2_specifiche%20impianto.pdf",
    },
];

/// Templates visible at `site`, optionally narrowed to one category.
pub fn documents_for(site: Site, category: Option<Category>) -> Vec<DocumentTemplate> {
    CATALOG
        .iter()
        .filter(|doc| site.allows(doc.category))
        .filter(|doc| category.map_or(true, |c| doc.category == c))
        .cloned()
        .collect()
}
