//! HEALPix NESTED pixel centres.
//!
//! Only the piece of HEALPix the grid needs: `pix2ang` in the nested scheme
//! for `nside = 2^order`. Nested numbering is what makes the S2 grid
//! hierarchical: the four children of pixel `p` at `order + 1` are
//! `4p .. 4p + 3`.

use std::f64::consts::FRAC_PI_2;

/// Row index (in units of `nside`) of the southernmost corner of each base face.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
/// Longitude index (in units of `nside / 2`) of each base face.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// Number of pixels on the sphere at `nside = 2^order`.
#[inline]
pub fn npix(order: u32) -> u64 {
    12 << (2 * order)
}

/// Keep the even bits of `v`, packed into the low half.
#[inline]
fn compress_bits(v: u64) -> u64 {
    let mut raw = v & 0x5555_5555_5555_5555;
    raw |= raw >> 1;
    raw &= 0x3333_3333_3333_3333;
    raw |= raw >> 2;
    raw &= 0x0f0f_0f0f_0f0f_0f0f;
    raw |= raw >> 4;
    raw &= 0x00ff_00ff_00ff_00ff;
    raw |= raw >> 8;
    raw &= 0x0000_ffff_0000_ffff;
    raw |= raw >> 16;
    raw & 0x0000_0000_ffff_ffff
}

/// Colatitude `theta` and longitude `phi` (radians) of a nested pixel centre.
///
/// Panics if `pix` is outside `[0, 12 * 4^order)`.
pub fn pix2ang_nest(order: u32, pix: u64) -> (f64, f64) {
    assert!(
        pix < npix(order),
        "HEALPix pixel {pix} out of range for order {order}"
    );
    let nside = 1i64 << order;
    let npface = 1u64 << (2 * order);

    let face = (pix >> (2 * order)) as usize;
    let local = pix & (npface - 1);
    let ix = compress_bits(local) as i64;
    let iy = compress_bits(local >> 1) as i64;

    let jr = (JRLL[face] << order) - ix - iy - 1;
    let fact2 = 4.0 / npix(order) as f64;
    let fact1 = (nside << 1) as f64 * fact2;

    let (nr, z, sth) = if jr < nside {
        // north polar cap
        let nr = jr;
        let tmp = (nr * nr) as f64 * fact2;
        (nr, 1.0 - tmp, (tmp * (2.0 - tmp)).sqrt())
    } else if jr > 3 * nside {
        // south polar cap
        let nr = 4 * nside - jr;
        let tmp = (nr * nr) as f64 * fact2;
        (nr, tmp - 1.0, (tmp * (2.0 - tmp)).sqrt())
    } else {
        let z = (2 * nside - jr) as f64 * fact1;
        (nside, z, ((1.0 - z) * (1.0 + z)).sqrt())
    };

    let mut tmp = JPLL[face] * nr + ix - iy;
    if tmp < 0 {
        tmp += 8 * nr;
    } else if tmp >= 8 * nr {
        tmp -= 8 * nr;
    }
    let phi = if nr == nside {
        0.75 * FRAC_PI_2 * tmp as f64 * fact1
    } else {
        0.5 * FRAC_PI_2 * tmp as f64 / nr as f64
    };

    (sth.atan2(z), phi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn uvec(theta: f64, phi: f64) -> [f64; 3] {
        [theta.sin() * phi.cos(), theta.sin() * phi.sin(), theta.cos()]
    }

    fn angle(a: [f64; 3], b: [f64; 3]) -> f64 {
        (a[0] * b[0] + a[1] * b[1] + a[2] * b[2]).clamp(-1.0, 1.0).acos()
    }

    #[test]
    fn order_zero_matches_reference_centres() {
        let (theta, phi) = pix2ang_nest(0, 0);
        assert!((theta - (2.0f64 / 3.0).acos()).abs() < 1e-12);
        assert!((phi - PI / 4.0).abs() < 1e-12);

        let (theta, phi) = pix2ang_nest(0, 4);
        assert!((theta - PI / 2.0).abs() < 1e-12);
        assert!(phi.abs() < 1e-12);

        let (theta, phi) = pix2ang_nest(0, 8);
        assert!((theta - (-2.0f64 / 3.0).acos()).abs() < 1e-12);
        assert!((phi - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn pixel_centres_are_distinct() {
        for order in 0..3 {
            let pts: Vec<[f64; 3]> = (0..npix(order))
                .map(|p| {
                    let (t, f) = pix2ang_nest(order, p);
                    uvec(t, f)
                })
                .collect();
            for i in 0..pts.len() {
                for j in (i + 1)..pts.len() {
                    assert!(angle(pts[i], pts[j]) > 1e-6, "order {order}: {i} == {j}");
                }
            }
        }
    }

    #[test]
    fn nested_children_stay_near_parent() {
        // Pixel size at order 1 is ~29°; children centres are within one pixel radius.
        for p in 0..npix(1) {
            let (t, f) = pix2ang_nest(1, p);
            let parent = uvec(t, f);
            for c in 4 * p..4 * p + 4 {
                let (tc, fc) = pix2ang_nest(2, c);
                assert!(angle(parent, uvec(tc, fc)) < 0.3);
            }
        }
    }

    #[test]
    #[should_panic]
    fn out_of_range_pixel_panics() {
        pix2ang_nest(1, npix(1));
    }
}
