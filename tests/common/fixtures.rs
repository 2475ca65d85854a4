use mammometry::{Detection, DetectionBatch, ImageSize};

pub fn image() -> ImageSize {
    ImageSize {
        width: 1024.0,
        height: 768.0,
    }
}

pub fn landmark(label: &str, x: f64, y: f64) -> Detection {
    Detection::new(label, x, y, 12.0, 12.0, 0.9)
}

/// Frontal torso with every landmark and a 10 cm ruler 200 px wide.
pub fn full_torso() -> Vec<Detection> {
    vec![
        Detection::new("ruler", 512.0, 700.0, 200.0, 20.0, 0.95),
        landmark("mamilo_esquerdo", 380.0, 400.0),
        landmark("mamilo_direito", 640.0, 410.0),
        landmark("sulco_inframamario_esquerdo", 380.0, 520.0),
        landmark("sulco_inframamario_direito", 640.0, 530.0),
        Detection::new("base_mama_esquerda", 370.0, 330.0, 230.0, 200.0, 0.8),
        Detection::new("base_mama_direita", 650.0, 340.0, 234.0, 200.0, 0.8),
        Detection::new("linha_media", 510.0, 420.0, 8.0, 500.0, 0.85),
    ]
}

pub fn batch(detections: Vec<Detection>) -> DetectionBatch {
    DetectionBatch::new(detections, image())
}

/// Multiplies every pixel quantity of the batch by `k`.
pub fn rescaled(batch: &DetectionBatch, k: f64) -> DetectionBatch {
    DetectionBatch::new(
        batch.detections.iter().map(|d| d.scaled(k)).collect(),
        ImageSize {
            width: batch.image.width * k,
            height: batch.image.height * k,
        },
    )
}
