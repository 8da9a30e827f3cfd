/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use changelog_translator::errors::{
    AppError, FetchError, NotificationError, ProviderError, StoreError, TranslationError,
};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 529,
        message: "Overloaded".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("529"));
    assert!(display.contains("Overloaded"));
}

#[test]
fn test_providerError_isClientError_shouldOnlyFlagRejectedRequests() {
    assert!(!ProviderError::ConnectionError("reset".to_string()).is_client_error());
    assert!(!ProviderError::StreamError("eof".to_string()).is_client_error());
    assert!(!ProviderError::RateLimitExceeded("slow down".to_string()).is_client_error());
    assert!(
        !ProviderError::ApiError {
            status_code: 500,
            message: String::new()
        }
        .is_client_error()
    );
    assert!(
        !ProviderError::ApiError {
            status_code: 408,
            message: String::new()
        }
        .is_client_error()
    );

    assert!(ProviderError::AuthenticationError("bad key".to_string()).is_client_error());
    assert!(
        ProviderError::ApiError {
            status_code: 400,
            message: String::new()
        }
        .is_client_error()
    );
}

#[test]
fn test_translationError_retriesExhausted_shouldKeepLastErrorAsSource() {
    let error = TranslationError::RetriesExhausted {
        attempts: 3,
        source: ProviderError::ConnectionError("timed out".to_string()),
    };

    let display = error.to_string();
    assert!(display.contains("3 attempts"));
    assert!(display.contains("timed out"));
    assert!(error.source().is_some());
}

#[test]
fn test_fetchError_status_shouldNameUrlAndCode() {
    let error = FetchError::Status {
        url: "https://example.com/CHANGELOG.md".to_string(),
        status_code: 404,
    };
    let display = error.to_string();
    assert!(display.contains("https://example.com/CHANGELOG.md"));
    assert!(display.contains("404"));
}

#[test]
fn test_appError_fromComponentErrors_shouldWrapInMatchingVariant() {
    let fetch: AppError = FetchError::Status {
        url: "u".to_string(),
        status_code: 500,
    }
    .into();
    assert!(matches!(fetch, AppError::Fetch(_)));

    let translation: AppError = TranslationError::EmptyResponse.into();
    assert!(matches!(translation, AppError::Translation(_)));
    assert!(translation.to_string().starts_with("Translation error"));

    let store: AppError = StoreError::Io {
        path: "state/translation_count.txt".into(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    }
    .into();
    assert!(matches!(store, AppError::Store(_)));
    assert!(store.to_string().contains("translation_count.txt"));

    let io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, AppError::File(_)));
}

#[test]
fn test_notificationError_status_shouldDisplayCode() {
    let error = NotificationError::Status {
        status_code: 401,
        message: "Invalid Webhook Token".to_string(),
    };
    assert!(error.to_string().contains("401"));
}
