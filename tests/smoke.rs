//! Basic smoke test to verify crate compiles.

#[test]
fn crate_compiles() {
    let _ = std::any::type_name::<licenseguard::LicenseGuardConfig>();
    let _ = std::any::type_name::<licenseguard::LicenseGuardError>();
    let _ = std::any::type_name::<licenseguard::LicenseManager>();
}
