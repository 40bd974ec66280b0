use reportscan::domain::{
    DocumentBuffer, DocumentMetadata, ExtractionError, ExtractionMethod, ExtractionResult,
    PageRange, ServiceError, SupportedFileType,
};

#[test]
fn given_magic_bytes_when_detecting_then_classifies_pdf_jpeg_and_png() {
    assert_eq!(SupportedFileType::detect(b"%PDF-1.7 ..."), SupportedFileType::Pdf);
    assert_eq!(
        SupportedFileType::detect(&[0xFF, 0xD8, 0xFF, 0xE1, 0x00]),
        SupportedFileType::Jpeg
    );
    assert_eq!(
        SupportedFileType::detect(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
        SupportedFileType::Png
    );
    assert_eq!(SupportedFileType::detect(b"PK\x03\x04zip"), SupportedFileType::Unknown);
}

#[test]
fn given_fewer_than_four_bytes_when_detecting_then_returns_unknown() {
    assert_eq!(SupportedFileType::detect(b"%PD"), SupportedFileType::Unknown);
    assert_eq!(SupportedFileType::detect(&[0xFF, 0xD8, 0xFF]), SupportedFileType::Unknown);
    assert_eq!(SupportedFileType::detect(&[]), SupportedFileType::Unknown);
}

#[test]
fn given_file_types_when_mapping_to_mime_then_uses_standard_types() {
    assert_eq!(SupportedFileType::Pdf.as_mime(), "application/pdf");
    assert_eq!(SupportedFileType::Jpeg.as_mime(), "image/jpeg");
    assert_eq!(SupportedFileType::Png.as_mime(), "image/png");
    assert!(SupportedFileType::Png.is_image());
    assert!(!SupportedFileType::Pdf.is_image());
    assert!(!SupportedFileType::Unknown.is_supported());
}

#[test]
fn given_invalid_bounds_when_building_page_range_then_returns_none() {
    assert!(PageRange::new(0, 3).is_none());
    assert!(PageRange::new(5, 4).is_none());

    let range = PageRange::new(16, 30).unwrap();
    assert_eq!(range.page_count(), 15);
    assert_eq!(range.to_string(), "16-30");
}

#[test]
fn given_declared_size_when_building_buffer_then_keeps_declared_value() {
    let data = vec![0x89, b'P', b'N', b'G', 0, 0];

    let buffer = DocumentBuffer::with_declared_size(data, "a.png", 50);

    assert_eq!(buffer.size_bytes, 50);
    assert_eq!(buffer.file_type, SupportedFileType::Png);
}

#[test]
fn given_parent_buffer_when_deriving_chunk_then_keeps_identity_and_redetects_type() {
    let parent = DocumentBuffer::new(b"%PDF-1.4 whole document".to_vec(), "report.pdf");

    let chunk = parent.derive(b"%PDF-1.4 pages 1-15".to_vec());

    assert_eq!(chunk.id, parent.id);
    assert_eq!(chunk.filename, "report.pdf");
    assert_eq!(chunk.size_bytes, 19);
    assert_eq!(chunk.file_type, SupportedFileType::Pdf);
}

#[test]
fn given_text_below_method_minimum_when_building_success_then_result_is_failure() {
    let metadata = DocumentMetadata::new(SupportedFileType::Pdf, ExtractionMethod::Vision);

    let result = ExtractionResult::succeeded(
        "short text that is only forty chars long".to_string(),
        ExtractionMethod::Vision,
        metadata,
        12,
    );

    assert!(!result.success);
    assert!(result.extracted_text.is_empty());
    assert!(result.error.unwrap().starts_with("NoTextExtracted"));
}

#[test]
fn given_twenty_chars_when_building_ocr_success_then_result_is_successful() {
    let metadata = DocumentMetadata::new(SupportedFileType::Pdf, ExtractionMethod::Ocr);

    let result = ExtractionResult::succeeded(
        "  exactly twenty chars  ".to_string(),
        ExtractionMethod::Ocr,
        metadata,
        3,
    );

    assert!(result.success);
    assert_eq!(result.method, ExtractionMethod::Ocr);
    assert_eq!(result.metadata.extraction_method, ExtractionMethod::Ocr);
    assert!(result.error.is_none());
}

#[test]
fn given_failed_result_when_serializing_then_uses_camel_case_fields() {
    let metadata = DocumentMetadata::new(SupportedFileType::Png, ExtractionMethod::Hybrid);
    let result = ExtractionResult::failed(
        "NoTextExtracted: nothing",
        ExtractionMethod::Hybrid,
        metadata,
        7,
    );

    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["success"], false);
    assert_eq!(json["extractedText"], "");
    assert_eq!(json["method"], "HYBRID");
    assert_eq!(json["processingTimeMs"], 7);
    assert_eq!(json["metadata"]["fileType"], "PNG");
}

#[test]
fn given_method_names_when_parsing_then_accepts_any_case() {
    assert_eq!("ocr".parse::<ExtractionMethod>().unwrap(), ExtractionMethod::Ocr);
    assert_eq!("VISION".parse::<ExtractionMethod>().unwrap(), ExtractionMethod::Vision);
    assert_eq!("Hybrid".parse::<ExtractionMethod>().unwrap(), ExtractionMethod::Hybrid);
    assert!("magic".parse::<ExtractionMethod>().is_err());
}

#[test]
fn given_error_kinds_when_classifying_then_reports_retryable_and_fatal() {
    assert!(ExtractionError::NoTextExtracted("x".into()).is_retryable());
    assert!(ExtractionError::Service(ServiceError::RateLimited).is_retryable());
    assert!(!ExtractionError::Service(ServiceError::PermissionDenied("x".into())).is_retryable());
    assert!(!ExtractionError::PayloadTooLarge { size: 2, limit: 1 }.is_retryable());

    assert!(ExtractionError::UnsupportedFileType("x".into()).is_fatal());
    assert!(ExtractionError::MissingCredentials("x".into()).is_fatal());
    assert!(ExtractionError::Cancelled("x".into()).is_fatal());
    assert!(!ExtractionError::NoTextExtracted("x".into()).is_fatal());
}

#[test]
fn given_error_when_displayed_then_message_starts_with_kind_name() {
    let error = ExtractionError::PageExtractionFailed("pages 1-15".into());

    assert_eq!(error.to_string(), "PageExtractionFailed: pages 1-15");
}

#[test]
fn given_http_statuses_when_mapping_service_errors_then_picks_matching_kind() {
    assert!(matches!(
        ServiceError::from_status(400, "Document exceeds the page limit"),
        ServiceError::PageLimitExceeded(_)
    ));
    assert!(matches!(
        ServiceError::from_status(400, "bad base64"),
        ServiceError::InvalidArgument(_)
    ));
    assert!(matches!(ServiceError::from_status(401, ""), ServiceError::PermissionDenied(_)));
    assert!(matches!(ServiceError::from_status(404, ""), ServiceError::NotFound(_)));
    assert!(matches!(ServiceError::from_status(429, ""), ServiceError::RateLimited));
    assert!(matches!(ServiceError::from_status(504, ""), ServiceError::Timeout(_)));
    assert!(matches!(ServiceError::from_status(500, ""), ServiceError::RequestFailed(_)));
}
