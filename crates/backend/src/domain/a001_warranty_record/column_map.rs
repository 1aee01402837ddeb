use crate::shared::sheets::{RawRow, PROVENANCE_COLUMN};

/// Поле записи, которое читается из таблицы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    IntakeDate,
    DeviceName,
    DeviceBrand,
    DefectiveImei,
    Store,
    ReplacementDate,
    Supplier,
    DeliveredImei,
    Fault,
    Quantity,
    Price,
    ResolutionDate,
    Processed,
    Notes,
    Provenance,
}

/// Допустимые заголовки для каждого поля, в порядке приоритета.
///
/// Заголовки в таблице со временем меняются и на разных листах пишутся
/// по-разному; camelCase-варианты приходят от скрипта.
pub const COLUMN_SYNONYMS: &[(Field, &[&str])] = &[
    (Field::IntakeDate, &["FECHA", "FECHA DE INGRESO", "FECHA INGRESO"]),
    (
        Field::DeviceName,
        &["NOMBRE DEL EQUIPO", "NOMBRE EQUIPO", "NOMBREEQUIPO", "EQUIPO"],
    ),
    (
        Field::DeviceBrand,
        &["MARCA DEL EQUIPO", "MARCA EQUIPO", "MARCAEQUIPO", "MARCA"],
    ),
    (
        Field::DefectiveImei,
        &["IMEI MALO", "IMEIMALO", "IMEI DEFECTUOSO", "IMEI"],
    ),
    (Field::Store, &["TIENDA", "SUCURSAL"]),
    (
        Field::ReplacementDate,
        &[
            "FECHA QUE SE REALIZA EL CAMBIO",
            "FECHA DE CAMBIO",
            "FECHA CAMBIO",
            "FECHACAMBIO",
        ],
    ),
    (Field::Supplier, &["PROVEEDOR"]),
    (
        Field::DeliveredImei,
        &[
            "IMEI ENTREGADO AL CLIENTE",
            "IMEI ENTREGADO",
            "IMEIENTREGADO",
            "IMEI NUEVO",
        ],
    ),
    (
        Field::Fault,
        &["FALLA DEL EQUIPO EN CASO DE ACCESORIO", "FALLA DEL EQUIPO", "FALLA"],
    ),
    (Field::Quantity, &["CANTIDAD"]),
    (Field::Price, &["PRECIO DEL EQUIPO", "PRECIO", "VALOR"]),
    (
        Field::ResolutionDate,
        &[
            "FECHA EN QUE SE REALIZA EL CAMBIO",
            "FECHA REALIZA CAMBIO",
            "FECHAREALIZACAMBIO",
        ],
    ),
    (
        Field::Processed,
        &["EQUIPO PROCESADO", "EQUIPOPROCESADO", "PROCESADO"],
    ),
    (Field::Notes, &["OBSERVACIONES", "OBSERVACION", "NOTAS"]),
    (Field::Provenance, &[PROVENANCE_COLUMN, "ORIGEN", "HOJA"]),
];

/// Заголовки поля из таблицы синонимов
pub fn synonyms(field: Field) -> &'static [&'static str] {
    COLUMN_SYNONYMS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or(&[])
}

/// Значение поля: первый синоним с непустым значением, обрезанное по краям
pub fn resolve(row: &RawRow, field: Field) -> Option<&str> {
    synonyms(field)
        .iter()
        .filter_map(|name| row.get(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

/// Значение поля или пустая строка
pub fn resolve_or_empty(row: &RawRow, field: Field) -> String {
    resolve(row, field).unwrap_or_default().to_string()
}
