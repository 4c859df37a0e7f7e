use nalgebra::Vector3;

/// 正規化で許容する最小の長さ二乗
pub const MIN_LENGTH_SQ: f32 = 1e-6;

/// ゼロ付近のベクトルはゼロベクトルを返す正規化
pub fn safe_normal(v: &Vector3<f32>) -> Vector3<f32> {
    if v.norm_squared() < MIN_LENGTH_SQ {
        return Vector3::zeros();
    }
    v.normalize()
}

/// 2ベクトル間の角度（ラジアン, 0〜π）
/// どちらかの長さが0なら π/2
pub fn angle_between(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    let denominator = (a.norm_squared() * b.norm_squared()).sqrt();
    if denominator == 0.0 {
        return std::f32::consts::FRAC_PI_2;
    }
    (a.dot(b) / denominator).clamp(-1.0, 1.0).acos()
}

/// 上から見た（XY平面）符号付き角度（ラジアン）
/// 外積のzが負（時計回り）なら負
pub fn signed_angle(from: &Vector3<f32>, to: &Vector3<f32>) -> f32 {
    let angle = angle_between(from, to);
    if from.cross(to).z < 0.0 {
        -angle
    } else {
        angle
    }
}

/// p1→p2 のベクトルから鉛直成分を除いて正規化
pub fn horizontal(p1: &Vector3<f32>, p2: &Vector3<f32>) -> Vector3<f32> {
    let mut v = p2 - p1;
    v.z = 0.0;
    safe_normal(&v)
}

/// 0.5 は +∞ 側に丸める
pub fn round_half_up(value: f32) -> i32 {
    (value + 0.5).floor() as i32
}
