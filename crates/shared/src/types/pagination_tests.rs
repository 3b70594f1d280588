use super::*;

#[test]
fn test_page_request_default() {
    let request = PageRequest::default();
    assert_eq!(request.page, 1);
    assert_eq!(request.per_page, 50);
}

#[test]
fn test_page_request_offset() {
    assert_eq!(PageRequest::new(1, 20).offset(), 0);
    assert_eq!(PageRequest::new(3, 20).offset(), 40);
}

#[test]
fn test_page_request_clamps() {
    let request = PageRequest::new(0, 10_000);
    assert_eq!(request.page, 1);
    assert_eq!(request.limit(), u64::from(MAX_PER_PAGE));

    let zero = PageRequest { page: 0, per_page: 0 };
    assert_eq!(zero.offset(), 0);
    assert_eq!(zero.limit(), 1);
}

#[test]
fn test_page_response_new() {
    let response = PageResponse::new(vec![1, 2, 3], PageRequest::new(1, 10), 3);
    assert_eq!(response.data, vec![1, 2, 3]);
    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.total, 3);
    assert_eq!(response.meta.total_pages, 1);
}

#[test]
fn test_page_response_total_pages() {
    let response: PageResponse<u8> = PageResponse::new(vec![], PageRequest::new(2, 10), 21);
    assert_eq!(response.meta.total_pages, 3);

    let empty: PageResponse<u8> = PageResponse::new(vec![], PageRequest::new(1, 10), 0);
    assert_eq!(empty.meta.total_pages, 1);
}

#[test]
fn test_page_response_map() {
    let response = PageResponse::new(vec![1, 2], PageRequest::new(1, 10), 2).map(|n| n * 10);
    assert_eq!(response.data, vec![10, 20]);
    assert_eq!(response.meta.total, 2);
}
