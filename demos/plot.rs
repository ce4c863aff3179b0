use omnicalc::{differentiate_expression, generate_samples, simplify_expression, Domain};

fn main() {
    pretty_env_logger::init();

    let expression = std::env::args().nth(1).unwrap_or_else(|| "x^2 - 2x".to_string());

    match differentiate_expression(&expression, "x") {
        Ok(derivative) => println!("d/dx {} = {}", expression, derivative),
        Err(err) => println!("d/dx {}: {}", expression, err),
    }
    if let Ok(simplified) = simplify_expression(&expression) {
        println!("simplified: {}", simplified);
    }

    let points = generate_samples(&expression, Domain::new(-5.0, 5.0), 20);
    let (low, high) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.y), hi.max(p.y))
        });

    const WIDTH: f64 = 50.0;
    for point in &points {
        let column = if high > low {
            ((point.y - low) / (high - low) * WIDTH).round() as usize
        } else {
            0
        };
        println!("{:>6.2} | {}*  {:.4}", point.x, " ".repeat(column), point.y);
    }
}
