//! Built-in procedural track, played when no audio file is given.

/// Glicol composition spreading energy over low, mid and high bins
pub const GLICOL_COMPOSITION: &str = r#"
~gate: speed 4.0 >> seq 60 _67 64 _72
~amp: ~gate >> envperc 0.002 0.25
~pit: ~gate >> mul 261.63
~lead: tri ~pit >> mul ~amp >> mul 0.2
~sweep: sin 0.05 >> mul 2000 >> add 2600
~hat: noise 7 >> hpf ~sweep 2.0 >> mul ~amp >> mul 0.05
~bass: saw 65.41 >> lpf 300.0 1.0 >> mul 0.08
o: mix ~lead ~hat ~bass >> plate 0.2
"#;
