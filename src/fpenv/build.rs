use cfg_aliases::cfg_aliases;

fn main() {
    // Exactly one floating-point environment backend is compiled per target.
    // The `softfloat` feature wins over every hardware backend; `x87` forces
    // the legacy stack FPU on x86 targets that would otherwise use SSE.
    cfg_aliases! {
        soft_backend: { feature = "softfloat" },
        x87_backend: {
            all(
                any(target_arch = "x86", target_arch = "x86_64"),
                feature = "x87",
                not(feature = "softfloat")
            )
        },
        sse_backend: {
            all(
                any(target_arch = "x86", target_arch = "x86_64"),
                not(feature = "x87"),
                not(feature = "softfloat")
            )
        },
        neon_backend: {
            all(target_arch = "aarch64", not(feature = "softfloat"))
        },
        // Both x86 backends share the 387 control word layout.
        x86_fpu: {
            all(
                any(target_arch = "x86", target_arch = "x86_64"),
                not(feature = "softfloat")
            )
        },
    }
}
