/// Число с разделителем тысяч (точкой): 1234567 -> "1.234.567"
pub fn format_number(n: usize) -> String {
    let digits = n.to_string();
    let head = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - head) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
