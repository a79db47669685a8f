//! Boundary to the narrative summarizer.
//!
//! Summaries are written by an external language model; this module only
//! defines what it is given and the instructions that go with it.

use crate::{Attachment, AttachmentType, ExtractedFields, Result};
use serde::Serialize;

const INSTRUCTIONS: &str = "\
You are an AI assistant. Summarize the following company auditor appointment information in 3-5 lines.

Always include the following details in the summary if available: company name, CIN, registered office, email, \
auditor name, auditor address, auditor FRN or membership number, appointment type, appointment dates, and AGM date.
Format your output exactly like this (including bold filenames using double asterisks):

Here is a summary of the company auditor appointment information:

[Your 3-5 line summary here, mentioning all the above fields if present]

Here are the summaries of the attached files:

- **[filename]**: [summary of what it confirms, states, or contains]

If the attachment is a consent letter, board resolution, or intimation letter, mention any key dates, names, or \
approvals found in the text.
If the attachment text is missing or unreadable, say so in the summary for that file.
If you find any additional insight (such as a signed consent, unanimous board approval, or special notes), mention \
it in the summary.
Be as detailed as possible in both the main summary and the attachment summaries. If there are multiple \
attachments, summarize each one in a separate bullet point.
Here is the data:

";

/// One attachment as the summarizer sees it. The storage path stays local.
#[derive(Debug, Clone, Serialize)]
pub struct AttachmentSummary {
    pub filename: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: AttachmentType,
}

impl From<&Attachment> for AttachmentSummary {
    fn from(a: &Attachment) -> Self {
        Self {
            filename: a.filename.clone(),
            text: a.text.clone(),
            kind: a.kind,
        }
    }
}

/// Payload handed to a [`Summarizer`]: the 13 fields at the top level plus
/// an `attachments` list.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryInput {
    #[serde(flatten)]
    pub fields: ExtractedFields,
    pub attachments: Vec<AttachmentSummary>,
}

impl SummaryInput {
    pub fn new(fields: &ExtractedFields, attachments: &[Attachment]) -> Self {
        Self {
            fields: fields.clone(),
            attachments: attachments.iter().map(AttachmentSummary::from).collect(),
        }
    }
}

/// Writes a narrative summary of one filing.
pub trait Summarizer {
    fn summarize(&self, input: &SummaryInput) -> Result<String>;
}

/// Instructions plus the pretty-printed JSON payload.
pub fn build_prompt(input: &SummaryInput) -> Result<String> {
    let payload = serde_json::to_string_pretty(input)?;
    Ok(format!("{INSTRUCTIONS}{payload}"))
}
