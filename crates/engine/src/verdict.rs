// SPDX-License-Identifier: MIT

//! Overall verdict computation (spec §4.7, last paragraph).

use ztp_core::DocumentStatus;
use ztp_document::ProvisioningDocument;

/// `(status, error)` for the document once the execution loop has stopped.
pub fn compute(doc: &ProvisioningDocument) -> (DocumentStatus, Option<String>) {
    if doc.policy.ignore_result {
        return (DocumentStatus::Success, None);
    }

    for (name, section) in &doc.sections {
        if section.status == ztp_core::SectionStatus::Failed && !section.policy.ignore_result {
            return (DocumentStatus::Failed, Some(format!("{name} FAILED")));
        }
    }

    (DocumentStatus::Success, None)
}
