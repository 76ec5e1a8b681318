//! Absence classification for status-query errors
//!
//! Determines whether a failed query means "the watched thing no longer
//! exists". The control plane reports this with a structured
//! `ResourceNotFoundException` code and a message prefix, but some client
//! stacks flatten the signal into a plain message, so each predicate also
//! matches the free-text form.

use crate::target::DescribeError;

/// Structured code covering every not-found condition
const NOT_FOUND_CODE: &str = "ResourceNotFoundException";

/// Message prefix when a cluster lookup misses
const NO_CLUSTER_PREFIX: &str = "No cluster found for";

/// Free-text fragment for a flattened cluster miss
// ResourceNotFoundException: No cluster found for name: demo-155468BC\n\tstatus code: 404
const NO_CLUSTER_FRAGMENT: &str = "No cluster found for name: ";

/// Message prefix when an update lookup misses
const NO_UPDATE_PREFIX: &str = "No update found for";

/// Free-text fragment for a flattened update miss
// ResourceNotFoundException when calling DescribeUpdate: No update found for ID: 10bddb13
const NO_UPDATE_FRAGMENT: &str = "No update found";

/// Check whether an error says the watched cluster no longer exists
pub fn is_cluster_gone(error: &DescribeError) -> bool {
    if error.code.as_deref() == Some(NOT_FOUND_CODE)
        && error.message.starts_with(NO_CLUSTER_PREFIX)
    {
        return true;
    }
    error.message.contains(NO_CLUSTER_FRAGMENT)
}

/// Check whether an error says the watched update does not exist
pub fn is_update_gone(error: &DescribeError) -> bool {
    if error.code.as_deref() == Some(NOT_FOUND_CODE)
        && error.message.starts_with(NO_UPDATE_PREFIX)
    {
        return true;
    }
    error.message.contains(NO_UPDATE_FRAGMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_structured_code_and_prefix() {
        let err = DescribeError::new(NOT_FOUND_CODE, "No cluster found for name: demo");
        assert!(is_cluster_gone(&err));
    }

    #[test]
    fn cluster_free_text_fallback() {
        let err = DescribeError::from_message(
            "ResourceNotFoundException: No cluster found for name: demo\n\tstatus code: 404",
        );
        assert!(is_cluster_gone(&err));
    }

    #[test]
    fn cluster_code_without_prefix_is_not_gone() {
        let err = DescribeError::new(NOT_FOUND_CODE, "No node group found for name: workers");
        assert!(!is_cluster_gone(&err));
    }

    #[test]
    fn cluster_unrelated_errors_are_not_gone() {
        assert!(!is_cluster_gone(&DescribeError::new(
            "ThrottlingException",
            "Rate exceeded"
        )));
        assert!(!is_cluster_gone(&DescribeError::from_message(
            "connection refused"
        )));
    }

    #[test]
    fn update_structured_code_and_prefix() {
        let err = DescribeError::new(NOT_FOUND_CODE, "No update found for ID: 10bddb13");
        assert!(is_update_gone(&err));
    }

    #[test]
    fn update_free_text_fallback() {
        let err = DescribeError::from_message(
            "An error occurred (ResourceNotFoundException) when calling the DescribeUpdate \
             operation: No update found for ID: 10bddb13",
        );
        assert!(is_update_gone(&err));
    }

    #[test]
    fn update_errors_do_not_classify_as_cluster_gone() {
        let err = DescribeError::new(NOT_FOUND_CODE, "No update found for ID: 10bddb13");
        assert!(!is_cluster_gone(&err));
    }
}
