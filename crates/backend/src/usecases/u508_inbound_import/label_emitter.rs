use contracts::usecases::u508_inbound_import::BoxLabel;
use std::collections::BTreeSet;

use super::reconciliation::BoxGroup;

/// Содержимое 2D-кода: IMEI по одному на строку, по возрастанию
pub fn qr_payload(identifiers: &BTreeSet<String>) -> String {
    identifiers
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Данные поля ZPL в hex-нотации `^FH` для управляющих символов
fn zpl_field(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '^' => out.push_str("_5E"),
            '~' => out.push_str("_7E"),
            '_' => out.push_str("_5F"),
            c if c.is_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out
}

/// Этикетка ZPL: устройство, номер коробки, количество
pub fn printer_markup(device: &str, box_no: &str, quantity: usize) -> String {
    format!(
        "^XA^CI28\
         ^FO30,30^A0N,40,40^FH_^FD{}^FS\
         ^FO30,80^A0N,40,40^FH_^FDBOX {}^FS\
         ^FO30,130^A0N,30,30^FDQTY {}^FS\
         ^XZ",
        zpl_field(device),
        zpl_field(box_no),
        quantity
    )
}

pub fn build_label(group: &BoxGroup) -> BoxLabel {
    BoxLabel {
        device: group.device.clone(),
        box_no: group.box_no.clone(),
        quantity: group.quantity(),
        qr_payload: qr_payload(&group.identifiers),
        printer_markup: printer_markup(&group.device, &group.box_no, group.quantity()),
    }
}

/// Этикетки по (устройство, коробка)
pub fn build_labels(groups: &[BoxGroup]) -> Vec<BoxLabel> {
    let mut labels: Vec<BoxLabel> = groups.iter().map(build_label).collect();
    labels.sort_by(|a, b| (&a.device, &a.box_no).cmp(&(&b.device, &b.box_no)));
    labels
}
