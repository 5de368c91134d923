/*! Integration tests for Quorum.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - ledger: Tests for the Ledger through its public API, including retries and persistence
 * - commands: Tests for permission, rate-limit and duplicate checks in the command layer
 * - settings: Tests for loading settings and their effect on a ledger
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("quorum=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod commands;
mod helpers;
mod ledger;
mod settings;
