//! Patient registration against an in-memory backend

mod common;

use common::{Call, MockBackend};
use evidence_core::patients::register_patient;
use evidence_core::{ErrorKind, PatientRegistration};
use std::sync::Arc;

fn patient(cedula: &str) -> PatientRegistration {
    PatientRegistration {
        nombre: "Ana Vera".into(),
        cedula: cedula.into(),
        edad: "42".into(),
        genero: "F".into(),
        antecedentes: "Ninguno".into(),
    }
}

#[tokio::test]
async fn test_registration_returns_cedula_to_open() {
    let backend = Arc::new(MockBackend::new());

    let cedula = register_patient(backend.clone(), patient(" 0912345678 "))
        .await
        .unwrap();

    assert_eq!(cedula, "0912345678");
    assert_eq!(
        backend.calls(),
        vec![Call::RegisterPatient(" 0912345678 ".to_string())]
    );
}

#[tokio::test]
async fn test_invalid_registration_never_reaches_backend() {
    let backend = Arc::new(MockBackend::new());

    let err = register_patient(backend.clone(), patient(""))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Local);
    assert!(backend.calls().is_empty());
}
