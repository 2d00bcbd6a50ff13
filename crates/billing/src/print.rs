//! Render, save and print bills.

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;
use tracing::{info, warn};

use shopkeep_core::{DomainError, FileSink, SavedFile, SinkError};
use shopkeep_pdf::{RenderError, render_pdf};

use crate::company::CompanyProfile;
use crate::invoice::Invoice;
use crate::layout::layout_bill;

#[derive(Debug, Error)]
pub enum BillError {
    #[error(transparent)]
    Validation(#[from] DomainError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Save(#[from] SinkError),
    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

#[derive(Debug, Error)]
pub enum ViewerError {
    /// The viewer could not be opened at all (missing, blocked, no display).
    #[error("viewer blocked: {0}")]
    Blocked(String),
    /// The viewer opened but printing failed.
    #[error("print failed: {0}")]
    Failed(String),
}

/// Something that can show a PDF and start printing it.
pub trait PrintViewer: Send + Sync {
    fn open_and_print(&self, title: &str, pdf: &[u8]) -> Result<(), ViewerError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintOutcome {
    Printed,
    /// The viewer was blocked; the bill was saved instead.
    Downloaded(SavedFile),
}

/// Hands the PDF to an external program (`lp`, `xdg-open`, ...) via a
/// temporary file.
#[derive(Debug, Clone)]
pub struct CommandViewer {
    program: String,
    args: Vec<String>,
    spool_dir: PathBuf,
}

impl CommandViewer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            spool_dir: std::env::temp_dir(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = dir.into();
        self
    }
}

impl PrintViewer for CommandViewer {
    fn open_and_print(&self, title: &str, pdf: &[u8]) -> Result<(), ViewerError> {
        let stamp = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let path = self
            .spool_dir
            .join(format!("{}-{}.pdf", sanitize(title), stamp));
        std::fs::write(&path, pdf).map_err(|e| ViewerError::Blocked(e.to_string()))?;

        let result = match Command::new(&self.program).args(&self.args).arg(&path).status() {
            Ok(status) if status.success() => return Ok(()),
            Ok(status) => ViewerError::Failed(format!("{} exited with {status}", self.program)),
            Err(e) => ViewerError::Blocked(format!("{}: {e}", self.program)),
        };
        // Kept on success: the viewer may still be reading it.
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "could not remove spooled bill");
        }
        Err(result)
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

/// PDF bytes for `invoice`. Validation failures stop before layout.
pub fn generate(invoice: &Invoice, profile: &CompanyProfile) -> Result<Vec<u8>, BillError> {
    let layout = layout_bill(invoice, profile)?;
    let title = format!("Invoice {}", invoice.number);
    Ok(render_pdf(&layout.canvas, &title)?)
}

/// Bill generation bound to one shop's profile.
#[derive(Debug, Clone, Default)]
pub struct BillGenerator {
    profile: CompanyProfile,
}

impl BillGenerator {
    pub fn new(profile: CompanyProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &CompanyProfile {
        &self.profile
    }

    pub fn file_name(invoice: &Invoice) -> String {
        format!("Invoice_{}.pdf", sanitize(&invoice.number))
    }

    pub fn generate(&self, invoice: &Invoice) -> Result<Vec<u8>, BillError> {
        generate(invoice, &self.profile)
    }

    pub fn save_to_file(
        &self,
        invoice: &Invoice,
        sink: &dyn FileSink,
    ) -> Result<SavedFile, BillError> {
        let bytes = self.generate(invoice)?;
        let saved = sink.save(&Self::file_name(invoice), &bytes)?;
        info!(invoice = %invoice.number, location = %saved.location, "bill saved");
        Ok(saved)
    }

    /// Print through `viewer`; a blocked viewer falls back to saving.
    pub fn print(
        &self,
        invoice: &Invoice,
        viewer: &dyn PrintViewer,
        sink: &dyn FileSink,
    ) -> Result<PrintOutcome, BillError> {
        let bytes = self.generate(invoice)?;
        match viewer.open_and_print(&format!("Invoice_{}", invoice.number), &bytes) {
            Ok(()) => {
                info!(invoice = %invoice.number, "bill sent to printer");
                Ok(PrintOutcome::Printed)
            }
            Err(ViewerError::Blocked(reason)) => {
                warn!(invoice = %invoice.number, %reason, "print viewer blocked, saving instead");
                let saved = sink.save(&Self::file_name(invoice), &bytes)?;
                Ok(PrintOutcome::Downloaded(saved))
            }
            Err(err) => Err(err.into()),
        }
    }
}
