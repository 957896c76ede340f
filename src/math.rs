use ndarray::{arr1, Array1};

pub fn norm(vector: &Array1<f64>) -> f64 {
    return vector.dot(vector).sqrt();
}

pub fn norm_sq(vector: &Array1<f64>) -> f64 {
    return vector.dot(vector);
}

pub fn dist_sq(x: &Array1<f64>, y: &Array1<f64>) -> f64 {
    let d = x - y;
    return d.dot(&d);
}

pub fn normalize(vec: &Array1<f64>) -> Array1<f64> {
    let len = norm(vec);
    if len == 0.0 {
        return arr1(&[0.0, 0.0]);
    }
    return vec / len;
}

pub fn cross(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    return a[0] * b[1] - a[1] * b[0];
}
