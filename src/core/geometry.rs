//! Reine Geometrie-Funktionen für Polylinien.
//!
//! Layer-neutral: kann von `core`, `app::tools` und `app::use_cases`
//! importiert werden ohne Zirkel-Abhängigkeiten zu erzeugen.

use glam::Vec2;

/// Approximierte Länge einer Polyline.
pub fn polyline_length(points: &[Vec2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Nächster Punkt auf dem Segment a–b zur Query-Position.
///
/// Gibt Punkt und Parameter t ∈ [0, 1] zurück.
pub fn closest_point_on_segment(query: Vec2, a: Vec2, b: Vec2) -> (Vec2, f32) {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return (a, 0.0);
    }
    let t = ((query - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    (a + ab * t, t)
}

/// Ergebnis einer Projektion auf eine Polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineProjection {
    /// Projizierter Punkt auf der Polyline
    pub point: Vec2,
    /// Index des getroffenen Segments (Stützpunkt i → i+1)
    pub segment: usize,
    /// Parameter innerhalb des Segments (0 = Segmentanfang)
    pub t: f32,
    /// Euklidische Distanz Query → projizierter Punkt
    pub distance: f32,
}

/// Projiziert eine Position auf die global nächste Stelle einer Polyline.
///
/// Vergleicht alle Segmente und gibt den global nächsten Treffer zurück.
/// `None` bei weniger als 2 Stützpunkten oder nicht-finiten Koordinaten.
pub fn project_onto_polyline(query: Vec2, points: &[Vec2]) -> Option<PolylineProjection> {
    if points.len() < 2 || !query.is_finite() {
        return None;
    }

    let mut best: Option<PolylineProjection> = None;
    for (i, pair) in points.windows(2).enumerate() {
        if !pair[0].is_finite() || !pair[1].is_finite() {
            return None;
        }
        let (point, t) = closest_point_on_segment(query, pair[0], pair[1]);
        let distance = query.distance(point);
        let better = match &best {
            Some(b) => distance < b.distance,
            None => true,
        };
        if better {
            best = Some(PolylineProjection {
                point,
                segment: i,
                t,
                distance,
            });
        }
    }
    best
}

/// Teilt eine Polyline am projizierten Punkt in zwei Hälften.
///
/// Fällt der Punkt innerhalb von `vertex_tolerance` mit einem inneren
/// Stützpunkt zusammen, wird dort geteilt statt einen neuen Punkt
/// einzufügen. Beide Hälften enthalten den Teilungspunkt.
///
/// `None` wenn der Schnitt degeneriert wäre (Teilung an einem Endpunkt
/// oder eine Hälfte mit weniger als 2 Stützpunkten).
pub fn split_polyline(
    points: &[Vec2],
    projection: &PolylineProjection,
    vertex_tolerance: f32,
) -> Option<(Vec<Vec2>, Vec<Vec2>)> {
    if points.len() < 2 || projection.segment + 1 >= points.len() {
        return None;
    }

    // Zusammenfallen mit existierendem Stützpunkt prüfen (Segment-Enden)
    let seg_start = projection.segment;
    let seg_end = projection.segment + 1;
    let split_index = if projection.point.distance(points[seg_start]) <= vertex_tolerance {
        Some(seg_start)
    } else if projection.point.distance(points[seg_end]) <= vertex_tolerance {
        Some(seg_end)
    } else {
        None
    };

    match split_index {
        Some(idx) => {
            // Teilung an einem Endpunkt wäre degeneriert
            if idx == 0 || idx + 1 == points.len() {
                return None;
            }
            let first = points[..=idx].to_vec();
            let second = points[idx..].to_vec();
            Some((first, second))
        }
        None => {
            let mut first = points[..=seg_start].to_vec();
            first.push(projection.point);
            let mut second = vec![projection.point];
            second.extend_from_slice(&points[seg_end..]);
            if first.len() < 2 || second.len() < 2 {
                return None;
            }
            Some((first, second))
        }
    }
}

/// Richtung des Segments, auf dem die Projektion liegt.
///
/// `None` bei degeneriertem (punktförmigem) Segment.
pub fn segment_direction(points: &[Vec2], segment: usize) -> Option<Vec2> {
    let a = *points.get(segment)?;
    let b = *points.get(segment + 1)?;
    let dir = b - a;
    if dir.length_squared() <= f32::EPSILON {
        return None;
    }
    Some(dir.normalize())
}

/// Echter Schnittpunkt zweier Segmente a1–a2 und b1–b2.
///
/// Berührungen an den Segment-Enden (t bzw. u nahe 0/1) zählen nicht als
/// Kreuzung — gemeinsame Endpunkte sind topologisch gewollt.
pub fn segment_intersection(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> Option<Vec2> {
    const END_EPS: f32 = 1e-4;

    let r = a2 - a1;
    let s = b2 - b1;
    let denom = r.perp_dot(s);
    if denom.abs() <= f32::EPSILON {
        // parallel oder kollinear
        return None;
    }

    let qp = b1 - a1;
    let t = qp.perp_dot(s) / denom;
    let u = qp.perp_dot(r) / denom;

    let interior = |v: f32| v > END_EPS && v < 1.0 - END_EPS;
    if interior(t) && interior(u) {
        Some(a1 + r * t)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn polyline_length_sums_segments() {
        let points = [Vec2::ZERO, Vec2::new(3.0, 0.0), Vec2::new(3.0, 4.0)];
        assert_relative_eq!(polyline_length(&points), 7.0);
    }

    #[test]
    fn projection_finds_globally_closest_segment() {
        // L-förmige Polyline: Query liegt näher am zweiten Segment
        let points = [Vec2::ZERO, Vec2::new(10.0, 0.0), Vec2::new(10.0, 10.0)];
        let proj = project_onto_polyline(Vec2::new(9.0, 5.0), &points).expect("Treffer erwartet");

        assert_eq!(proj.segment, 1);
        assert_relative_eq!(proj.point.x, 10.0);
        assert_relative_eq!(proj.point.y, 5.0);
        assert_relative_eq!(proj.distance, 1.0);
    }

    #[test]
    fn projection_clamps_to_segment_ends() {
        let points = [Vec2::ZERO, Vec2::new(10.0, 0.0)];
        let proj = project_onto_polyline(Vec2::new(-5.0, 2.0), &points).expect("Treffer erwartet");

        assert_eq!(proj.point, Vec2::ZERO);
        assert_eq!(proj.t, 0.0);
    }

    #[test]
    fn projection_rejects_degenerate_input() {
        assert!(project_onto_polyline(Vec2::ZERO, &[Vec2::ONE]).is_none());
        assert!(project_onto_polyline(
            Vec2::new(f32::NAN, 0.0),
            &[Vec2::ZERO, Vec2::ONE]
        )
        .is_none());
    }

    #[test]
    fn split_inserts_new_vertex_mid_segment() {
        let points = [Vec2::ZERO, Vec2::new(100.0, 0.0)];
        let proj = project_onto_polyline(Vec2::new(40.0, 5.0), &points).expect("Projektion");
        let (first, second) = split_polyline(&points, &proj, 0.25).expect("Split erwartet");

        assert_eq!(first, vec![Vec2::ZERO, Vec2::new(40.0, 0.0)]);
        assert_eq!(second, vec![Vec2::new(40.0, 0.0), Vec2::new(100.0, 0.0)]);
    }

    #[test]
    fn split_reuses_interior_vertex_within_tolerance() {
        let points = [Vec2::ZERO, Vec2::new(50.0, 0.0), Vec2::new(100.0, 0.0)];
        let proj = project_onto_polyline(Vec2::new(50.1, 1.0), &points).expect("Projektion");
        let (first, second) = split_polyline(&points, &proj, 0.25).expect("Split erwartet");

        // Kein neuer Stützpunkt: Teilung exakt am inneren Stützpunkt
        assert_eq!(first, vec![Vec2::ZERO, Vec2::new(50.0, 0.0)]);
        assert_eq!(second, vec![Vec2::new(50.0, 0.0), Vec2::new(100.0, 0.0)]);
    }

    #[test]
    fn split_at_endpoint_is_rejected() {
        let points = [Vec2::ZERO, Vec2::new(100.0, 0.0)];
        let proj = project_onto_polyline(Vec2::new(-3.0, 0.0), &points).expect("Projektion");
        assert!(split_polyline(&points, &proj, 0.25).is_none());
    }

    #[test]
    fn crossing_segments_intersect_in_the_interior() {
        let hit = segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(5.0, -5.0),
            Vec2::new(5.0, 5.0),
        )
        .expect("Schnittpunkt erwartet");
        assert_relative_eq!(hit.x, 5.0);
        assert_relative_eq!(hit.y, 0.0);
    }

    #[test]
    fn shared_endpoint_is_not_a_crossing() {
        assert!(segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 10.0),
        )
        .is_none());
    }

    #[test]
    fn parallel_segments_do_not_intersect() {
        assert!(segment_intersection(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 1.0),
            Vec2::new(10.0, 1.0),
        )
        .is_none());
    }
}
