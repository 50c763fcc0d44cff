// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `status_reasons` module

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::status_reasons::*;

    const ALL: [&str; 11] = [
        REASON_PROPERTY_MISSING,
        REASON_PROPERTY_VALUE_FORMAT_ERROR,
        REASON_PROPERTY_VALUE_CONFLICT,
        REASON_MALFORMED_JSON,
        REASON_RESOURCE_ALREADY_EXISTS,
        REASON_RESOURCE_IN_USE,
        REASON_RESOURCE_NOT_FOUND,
        REASON_ACTION_NOT_SUPPORTED,
        REASON_RESOURCE_CANNOT_BE_DELETED,
        REASON_GENERAL_ERROR,
        REASON_INTERNAL_ERROR,
    ];

    #[test]
    fn test_reasons_are_unique() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn test_reasons_are_pascal_case() {
        for reason in ALL {
            assert!(
                reason.starts_with(|c: char| c.is_ascii_uppercase()),
                "{reason} should start upper-case"
            );
            assert!(
                reason.chars().all(|c| c.is_ascii_alphanumeric()),
                "{reason} should be alphanumeric"
            );
        }
    }

    #[test]
    fn test_redfish_identifiers() {
        assert_eq!(REASON_RESOURCE_CANNOT_BE_DELETED, "ResourceCannotBeDeleted");
        assert_eq!(REASON_PROPERTY_VALUE_CONFLICT, "PropertyValueConflict");
        assert_eq!(REASON_ACTION_NOT_SUPPORTED, "ActionNotSupported");
    }
}
