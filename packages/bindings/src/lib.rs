use napi::bindgen_prelude::Buffer;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::{Deserialize, Serialize};

use calc_kit_core::amortization::analysis;
use calc_kit_core::amortization::schedule::{
    self, ExtraPayment, LoanForm, LoanTerms, ScheduleOptions, StepUp,
};
use calc_kit_core::documents::margins::{self, MarginSpec};
use calc_kit_core::documents::merge;
use calc_kit_core::documents::queue::{FileQueue, SourceFile};
use calc_kit_core::CalcKitResult;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn placeholder(message: &str) -> NapiResult<String> {
    serde_json::to_string(&serde_json::json!({ "result": null, "message": message }))
        .map_err(to_napi_error)
}

/// Serialize a calculation result. Validation failures come back as the
/// neutral placeholder envelope; anything else is thrown.
fn respond<T: Serialize>(result: CalcKitResult<T>) -> NapiResult<String> {
    match result {
        Ok(output) => serde_json::to_string(&output).map_err(to_napi_error),
        Err(e) if e.is_validation() => {
            serde_json::to_string(&serde_json::json!({
                "result": null,
                "message": "Enter valid values to see results",
                "reason": e.to_string(),
            }))
            .map_err(to_napi_error)
        }
        Err(e) => Err(to_napi_error(e)),
    }
}

const LOAN_PLACEHOLDER: &str = "Enter loan amount, interest rate and tenure to see results";

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScheduleRequest {
    #[serde(flatten)]
    form: LoanForm,
    #[serde(flatten)]
    options: ScheduleOptions,
}

#[napi]
pub fn compute_schedule(input_json: String) -> NapiResult<String> {
    let request: ScheduleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    match LoanTerms::from_form(&request.form) {
        Some(terms) => respond(schedule::compute_schedule(&terms, &request.options)),
        None => placeholder(LOAN_PLACEHOLDER),
    }
}

#[derive(Deserialize)]
struct PrepaymentRequest {
    #[serde(flatten)]
    form: LoanForm,
    #[serde(default)]
    extra_payment: Option<ExtraPayment>,
}

#[napi]
pub fn analyze_prepayment(input_json: String) -> NapiResult<String> {
    let request: PrepaymentRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    match (LoanTerms::from_form(&request.form), request.extra_payment) {
        (Some(terms), Some(extra)) => respond(analysis::analyze_prepayment(&terms, &extra)),
        _ => placeholder(LOAN_PLACEHOLDER),
    }
}

#[derive(Deserialize)]
struct StepUpRequest {
    #[serde(flatten)]
    form: LoanForm,
    #[serde(default)]
    step_up: Option<StepUp>,
}

#[napi]
pub fn analyze_step_up(input_json: String) -> NapiResult<String> {
    let request: StepUpRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    match (LoanTerms::from_form(&request.form), request.step_up) {
        (Some(terms), Some(step_up)) => respond(analysis::analyze_step_up(&terms, &step_up)),
        _ => placeholder(LOAN_PLACEHOLDER),
    }
}

// ---------------------------------------------------------------------------
// Lease
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_lease(input_json: String) -> NapiResult<String> {
    let input: calc_kit_core::lease::payment::LeaseInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    respond(calc_kit_core::lease::payment::calculate_lease(&input))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_cholesterol(input_json: String) -> NapiResult<String> {
    let input: calc_kit_core::health::cholesterol::CholesterolPanel =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    respond(calc_kit_core::health::cholesterol::assess_cholesterol(&input))
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_paragraphs(text: String) -> NapiResult<String> {
    if text.trim().is_empty() {
        return placeholder("Paste or type text to see paragraph statistics");
    }
    let output = calc_kit_core::text::paragraphs::analyze_paragraphs(&text);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

#[napi(object)]
pub struct PdfFile {
    pub name: String,
    pub data: Buffer,
}

#[napi(object)]
pub struct PdfResult {
    pub file_name: String,
    pub page_count: u32,
    pub data: Buffer,
}

fn queue_files(files: Vec<PdfFile>) -> CalcKitResult<FileQueue> {
    let mut queue = FileQueue::new();
    for file in files {
        queue.push(SourceFile::new(file.name, file.data.to_vec()))?;
    }
    Ok(queue)
}

/// Merge PDFs in array order. Non-PDF entries reject the whole call.
#[napi]
pub fn merge_pdfs(files: Vec<PdfFile>) -> NapiResult<PdfResult> {
    let queue = queue_files(files).map_err(to_napi_error)?;
    let artifact = merge::merge_documents(queue.files()).map_err(to_napi_error)?;
    Ok(PdfResult {
        file_name: artifact.file_name,
        page_count: artifact.page_count as u32,
        data: artifact.bytes.into(),
    })
}

#[napi]
pub fn adjust_pdf_margins(file: PdfFile, spec_json: String) -> NapiResult<PdfResult> {
    let spec: MarginSpec = serde_json::from_str(&spec_json).map_err(to_napi_error)?;
    let source = SourceFile::new(file.name, file.data.to_vec());
    let artifact = margins::adjust_margins(&source, &spec).map_err(to_napi_error)?;
    Ok(PdfResult {
        file_name: artifact.file_name,
        page_count: artifact.page_count as u32,
        data: artifact.bytes.into(),
    })
}
