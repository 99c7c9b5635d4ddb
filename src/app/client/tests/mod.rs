//! Tests for the Crowdin client against a local canned-response server
//!
//! `session` drives the real client over loopback HTTP; `real_service`
//! needs a live token and project and is ignored by default.

mod mock_server;
