use rand::Rng;

/// Generates a human-readable order number like `ORD-48213957`.
pub fn generate_order_number() -> String {
    let mut rng = rand::thread_rng();
    format!("ORD-{:08}", rng.gen_range(10000000..=99999999u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_order_number_format() {
        let number = generate_order_number();
        assert!(number.starts_with("ORD-"));
        assert_eq!(number.len(), 12);
        assert!(number[4..].chars().all(|c| c.is_ascii_digit()));
    }
}
