//! Request-scoped facts read from headers.
//!
//! The resolved [`learnhub_auth::AuthContext`] itself is built by
//! [`crate::middleware`] and handed to handlers as a request extension.

use axum::http::{HeaderMap, HeaderName, header};

use learnhub_auth::{AccessError, ClientInfo};

/// Tenant slug from the configured header. Absent or blank fails closed.
pub fn tenant_slug(headers: &HeaderMap, header_name: &HeaderName) -> Result<String, AccessError> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(AccessError::TenantContextMissing)
}

/// Bearer token from `Authorization`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AccessError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or(AccessError::Unauthenticated)?;
    if token.is_empty() {
        return Err(AccessError::Unauthenticated);
    }
    Ok(token)
}

/// Caller address (first `x-forwarded-for` hop) and user agent.
pub fn client_info(headers: &HeaderMap) -> ClientInfo {
    let text = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    ClientInfo {
        ip_address: text("x-forwarded-for")
            .and_then(|v| v.split(',').next().map(|hop| hop.trim().to_string()))
            .filter(|hop| !hop.is_empty()),
        user_agent: text(header::USER_AGENT.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn missing_or_blank_tenant_header_fails_closed() {
        let name = HeaderName::from_static("x-tenant-slug");
        let mut headers = HeaderMap::new();
        assert_eq!(tenant_slug(&headers, &name), Err(AccessError::TenantContextMissing));

        headers.insert(name.clone(), HeaderValue::from_static("  "));
        assert_eq!(tenant_slug(&headers, &name), Err(AccessError::TenantContextMissing));

        headers.insert(name.clone(), HeaderValue::from_static(" greenfield "));
        assert_eq!(tenant_slug(&headers, &name).unwrap(), "greenfield");
    }

    #[test]
    fn bearer_requires_scheme_and_value() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(AccessError::Unauthenticated));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), Err(AccessError::Unauthenticated));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer tok"));
        assert_eq!(bearer_token(&headers), Ok("tok"));
    }

    #[test]
    fn client_info_takes_first_forwarded_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 172.16.0.1"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("curl/8"));

        let client = client_info(&headers);
        assert_eq!(client.ip_address.as_deref(), Some("10.0.0.7"));
        assert_eq!(client.user_agent.as_deref(), Some("curl/8"));
        assert_eq!(client_info(&HeaderMap::new()), ClientInfo::default());
    }
}
