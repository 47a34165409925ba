use std::collections::BTreeMap;

use crate::EXPOSER_MANAGER_NAME;

pub fn get_exposure_labels() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app.kubernetes.io/name".to_owned(), EXPOSER_MANAGER_NAME.to_owned()),
        ("app.kubernetes.io/component".to_owned(), "exposure".to_owned()),
        ("app.kubernetes.io/managed-by".to_owned(), EXPOSER_MANAGER_NAME.to_owned()),
    ])
}

pub fn get_joined_exposure_labels() -> String {
    format!(
        "app.kubernetes.io/name={EXPOSER_MANAGER_NAME},\
        app.kubernetes.io/component=exposure,\
        app.kubernetes.io/managed-by={EXPOSER_MANAGER_NAME}"
    )
}
