pub fn mean(data: &[f64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().sum::<f64>() / count as f64),
    }
}

/// Mean of integer millisecond values
pub fn mean_ms(data: &[u64]) -> Option<f64> {
    match data.len() {
        0 => None,
        count => Some(data.iter().map(|&v| v as f64).sum::<f64>() / count as f64),
    }
}

/// Population standard deviation
pub fn std_dev(data: &[f64]) -> Option<f64> {
    let m = mean(data)?;
    let variance = mean(&data.iter().map(|v| (v - m).powi(2)).collect::<Vec<f64>>())?;
    Some(variance.sqrt())
}
