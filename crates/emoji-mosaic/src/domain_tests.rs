//! Domain-critical regression tests for emoji-mosaic.
//!
//! These tests exercise several modules together and guard behaviour a
//! single unit test cannot see. Each test documents the regression it
//! guards against.

#[cfg(test)]
mod domain_tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::api::EmojiMosaic;
    use crate::color::Rgb;
    use crate::corpus::{
        Cell, Corpus, CorpusEntry, EmbeddingCorpus, FeatureGrid, PcaBasis, CHANNELS,
    };
    use crate::diffuse::{
        ChannelWeights, DiffuserOptions, JaDiffuser, SourceCell, SourceFeatures, FLOYD_STEINBERG,
    };
    use crate::matcher::{
        image_to_mosaic, CompressedMatcher, EmojiMatch, MatchOptions, StructuralMatcher,
    };
    use crate::output::Mosaic;
    use crate::refine::{
        CodebookPattern, PatternCategory, Quad, QuadCodebook, QuadRefiner, RefinePolicy,
        RefineStatus, PATTERN_SIZE,
    };
    use crate::sample::{MosaicLayout, SourceImage};

    fn grey(size: usize, v: f32) -> FeatureGrid {
        FeatureGrid::uniform(size, Cell::new(v, v, v, 1.0))
    }

    fn checkerboard(size: usize) -> FeatureGrid {
        FeatureGrid::from_fn(size, |x, y| {
            let v = if (x + y) % 2 == 0 { 1.0 } else { 0.0 };
            Cell::new(v, v, v, 1.0)
        })
    }

    fn single_background(size: usize, entries: Vec<(&str, FeatureGrid)>) -> Corpus {
        Corpus::from_entries(
            size,
            vec!["white".into()],
            entries
                .into_iter()
                .map(|(c, g)| CorpusEntry::new(c).with_grid("white", g))
                .collect(),
        )
        .unwrap()
    }

    // ========================================================================
    // Matching
    // ========================================================================

    /// If this breaks, it means: an entry's own grid no longer matches that
    /// entry with best-only matching, so the distance is not zero at
    /// identity or the ranking is unstable.
    #[test]
    fn test_every_entry_matches_itself() {
        let size = 4;
        let corpus = single_background(
            size,
            vec![
                ("⬜", grey(size, 1.0)),
                ("⬛", grey(size, 0.0)),
                ("🩶", grey(size, 0.5)),
                ("🏁", checkerboard(size)),
                (
                    "🟥",
                    FeatureGrid::uniform(size, Cell::new(1.0, 0.0, 0.0, 1.0)),
                ),
                (
                    "🔴",
                    FeatureGrid::from_fn(size, |x, y| {
                        let inside = (1..3).contains(&x) && (1..3).contains(&y);
                        if inside {
                            Cell::new(1.0, 0.0, 0.0, 1.0)
                        } else {
                            Cell::new(1.0, 1.0, 1.0, 0.0)
                        }
                    }),
                ),
            ],
        );
        let bg = corpus.background_id("white").unwrap();
        let matcher = StructuralMatcher::new(&corpus);
        let mut rng = StdRng::seed_from_u64(1);

        for i in 0..corpus.len() {
            let grid = corpus.grid(bg, i);
            let result = matcher
                .find_match(&grid, bg, &MatchOptions::default(), None, &mut rng)
                .unwrap();
            assert_eq!(
                result.index, i,
                "REGRESSION: {} matched {} instead of itself",
                corpus.character(i),
                result.character
            );
            assert!(result.distance.abs() < 1e-6);
        }
    }

    /// If this breaks, it means: the matcher is comparing block averages
    /// instead of per-cell structure. A checkerboard and a mid-grey block
    /// have the same average colour; only the spatial layout separates them.
    #[test]
    fn test_checkerboard_prefers_structured_glyph_over_flat_grey() {
        let size = 8;
        let corpus = single_background(
            size,
            vec![("🩶", grey(size, 0.5)), ("🏁", checkerboard(size))],
        );
        let bg = corpus.background_id("white").unwrap();
        // 32×32 image, 4px squares: one block resamples to an exact 8×8 checkerboard
        let image = SourceImage::from_fn(32, 32, |x, y| {
            let v = if (x / 4 + y / 4) % 2 == 0 { 255 } else { 0 };
            [v, v, v, 255]
        });
        let layout = MosaicLayout::for_image(&image, 1, 1.0);
        let mut rng = StdRng::seed_from_u64(2);
        let mosaic = image_to_mosaic(
            &StructuralMatcher::new(&corpus),
            &image,
            &layout,
            bg,
            Rgb::WHITE,
            &MatchOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(mosaic.to_string(), "🏁");

        // A flat grey block goes the other way
        let flat = SourceImage::solid(32, 32, Rgb::new(0.5, 0.5, 0.5));
        let mosaic = image_to_mosaic(
            &StructuralMatcher::new(&corpus),
            &flat,
            &layout,
            bg,
            Rgb::WHITE,
            &MatchOptions::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(mosaic.to_string(), "🩶");
    }

    /// If this breaks, it means: corpus embeddings and query projections no
    /// longer go through the same projection, so the compressed matcher
    /// disagrees with the structural one. The basis keeps only 8 of the 80
    /// feature dimensions (one component per pair of cells, summing their
    /// RGB), and every entry queried with its own grid must pick an entry in
    /// its structural top 5 for at least 90% of the corpus.
    #[test]
    fn test_compressed_self_queries_agree_with_structural() {
        let size = 4;
        let cells = size * size;
        let input_len = cells * CHANNELS;
        let mut rng = StdRng::seed_from_u64(3);

        let names: Vec<String> = (0..40).map(|i| format!("g{i}")).collect();
        let entries: Vec<(&str, FeatureGrid)> = names
            .iter()
            .map(|name| {
                let grid = FeatureGrid::from_fn(size, |_, _| {
                    Cell::new(rng.gen(), rng.gen(), rng.gen(), 1.0)
                });
                (name.as_str(), grid)
            })
            .collect();
        let corpus = single_background(size, entries);

        let eigenvectors: Vec<Vec<f32>> = (0..cells / 2)
            .map(|k| {
                let mut ev = vec![0.0; input_len];
                for cell in [2 * k, 2 * k + 1] {
                    for channel in 0..3 {
                        ev[cell * CHANNELS + channel] = 1.0;
                    }
                }
                ev
            })
            .collect();
        let basis = PcaBasis {
            mean: vec![0.5; input_len],
            eigenvectors,
        };
        let embeddings =
            EmbeddingCorpus::from_corpus(&corpus, vec![("white".into(), basis)]).unwrap();
        assert_eq!(embeddings.dim(), 8);
        assert!(embeddings.dim() < input_len);

        let bg = corpus.background_id("white").unwrap();
        let structural = StructuralMatcher::new(&corpus);
        let compressed = CompressedMatcher::new(&embeddings);
        let ebg = compressed.background_id("white").unwrap();

        let mut hits = 0;
        for i in 0..corpus.len() {
            let own = corpus.grid(bg, i);
            let picked = compressed
                .find_match(&own, ebg, &MatchOptions::new(), None, &mut rng)
                .unwrap()
                .index;
            let ranked = structural.ranked(&own, bg, Default::default()).unwrap();
            let rank = ranked.iter().position(|(j, _)| *j == picked).unwrap();
            if rank < 5 {
                hits += 1;
            }
        }
        assert!(
            hits * 10 >= corpus.len() * 9,
            "REGRESSION: compressed pick in structural top 5 for only {hits}/{} entries",
            corpus.len()
        );
    }

    // ========================================================================
    // Quad refinement
    // ========================================================================

    fn white_codebook() -> QuadCodebook {
        let quad = |c: &str, dist: f32| Quad {
            chars: [c.into(), c.into(), c.into(), c.into()],
            dist,
        };
        QuadCodebook::new(
            "white",
            vec![CodebookPattern {
                name: "blank".into(),
                category: PatternCategory::Solid,
                pattern: vec![Rgb::WHITE; PATTERN_SIZE * PATTERN_SIZE],
                quads: vec![quad("🅰", 0.9), quad("🅱", 1.0), quad("🅲", 1.1)],
            }],
        )
    }

    /// If this breaks, it means: the selective policy replaces blocks whose
    /// best quad is not close enough, or the unconditional policy picks
    /// outside the top 3. A 3×3 mosaic has one aligned 2×2 block; the
    /// trailing row and column must never change.
    #[test]
    fn test_refine_policies_on_odd_mosaic() {
        let codebook = white_codebook();
        let refiner = QuadRefiner::new(Some(&codebook));
        let image = SourceImage::solid(12, 12, Rgb::WHITE);
        let layout = MosaicLayout::for_image(&image, 3, 1.0);
        let mosaic = Mosaic::filled(3, 3, "⬜");
        let mut rng = StdRng::seed_from_u64(4);

        let selective = refiner
            .refine(&mosaic, &image, &layout, RefinePolicy::default(), &mut rng)
            .unwrap();
        assert_eq!(selective.status, RefineStatus::Applied);
        assert_eq!(selective.replaced, 0);
        assert_eq!(selective.mosaic, mosaic);

        let lenient = refiner
            .refine(
                &mosaic,
                &image,
                &layout,
                RefinePolicy::Selective { threshold: 0.95 },
                &mut rng,
            )
            .unwrap();
        assert_eq!(lenient.replaced, 1);
        assert_eq!(lenient.mosaic.get(1, 1), "🅰");

        for _ in 0..10 {
            let outcome = refiner
                .refine(&mosaic, &image, &layout, RefinePolicy::Unconditional, &mut rng)
                .unwrap();
            assert_eq!(outcome.replaced, 1);
            let glyph = outcome.mosaic.get(0, 0);
            assert!(["🅰", "🅱", "🅲"].contains(&glyph));
            // One quad fills the whole block
            assert_eq!(outcome.mosaic.get(1, 1), glyph);
            for i in 0..3 {
                assert_eq!(outcome.mosaic.get(2, i), "⬜");
                assert_eq!(outcome.mosaic.get(i, 2), "⬜");
            }
        }
    }

    // ========================================================================
    // Diffusion
    // ========================================================================

    fn palette_corpus() -> (Corpus, Vec<Rgb>) {
        let colors = vec![
            Rgb::from_u8(255, 255, 255),
            Rgb::from_u8(0, 0, 0),
            Rgb::from_u8(255, 0, 0),
            Rgb::from_u8(0, 0, 255),
            Rgb::from_u8(0, 160, 0),
        ];
        let corpus = single_background(
            2,
            vec!["⬜", "⬛", "🟥", "🟦", "🟩"]
                .into_iter()
                .zip(&colors)
                .map(|(c, color)| (c, FeatureGrid::uniform(2, Cell::from_rgb(*color, 1.0))))
                .collect(),
        );
        (corpus, colors)
    }

    /// If this breaks, it means: a zero-iteration schedule still touches
    /// the mosaic, so disabling diffusion by iteration count is not a no-op.
    #[test]
    fn test_zero_iteration_diffusion_is_identity() {
        let (corpus, _) = palette_corpus();
        let image = SourceImage::from_fn(8, 8, |x, y| {
            if (x + y) % 3 == 0 {
                [255, 0, 0, 255]
            } else {
                [0, 0, 255, 255]
            }
        });
        let matched = EmojiMosaic::new(&corpus)
            .columns(4)
            .seed(5)
            .render(&image)
            .unwrap();
        let diffused = EmojiMosaic::new(&corpus)
            .columns(4)
            .diffuse(DiffuserOptions::new().iterations(0))
            .seed(5)
            .render(&image)
            .unwrap();
        assert_eq!(matched.mosaic, diffused.mosaic);
        let summary = diffused.diffusion.unwrap();
        assert_eq!(summary.initial_score, summary.final_score);
    }

    /// If this breaks, it means: greedy diffusion (temperature 0) accepted
    /// a worse glyph, or the candidate set no longer contains the nearest
    /// glyph by average colour. With colour as the only channel and exact
    /// glyphs for every source colour, the score must fall to zero.
    #[test]
    fn test_greedy_diffusion_never_worsens_score() {
        let (corpus, colors) = palette_corpus();
        let bg = corpus.background_id("white").unwrap();
        let options = DiffuserOptions::new()
            .initial_temperature(0.0)
            .iterations(3)
            .weights(ChannelWeights {
                color: 1.0,
                texture: 0.0,
                pattern: 0.0,
                contrast: 0.0,
            });
        let diffuser = JaDiffuser::new(&corpus, bg, options);

        let image = SourceImage::from_fn(10, 10, |x, y| {
            let c = colors[((x / 2) + (y / 2)) as usize % colors.len()].to_bytes();
            [c[0], c[1], c[2], 255]
        });
        let layout = MosaicLayout::for_image(&image, 5, 1.0);
        let start = Mosaic::filled(5, 5, "⬛");
        let mut rng = StdRng::seed_from_u64(6);

        let outcome = diffuser
            .diffuse(&start, &image, &layout, Rgb::WHITE, &mut rng)
            .unwrap();
        assert!(outcome.final_score <= outcome.initial_score);
        assert!(
            outcome.final_score < 1e-6,
            "REGRESSION: greedy diffusion stopped at score {}",
            outcome.final_score
        );
        for report in &outcome.iterations {
            assert!(report.score <= outcome.initial_score);
        }
    }

    /// If this breaks, it means: the diffusion kernel no longer conserves
    /// the residual. An interior cell hands its whole error to neighbours;
    /// a corner cell on the right edge loses the share that falls outside.
    #[test]
    fn test_error_diffusion_conserves_interior_residual() {
        let blank = vec![SourceCell::uniform(Rgb::WHITE); 9];
        let mut features = SourceFeatures::from_cells(3, 3, blank.clone());
        let error = Rgb::new(0.16, -0.32, 0.08);
        features.diffuse_error(1, 0, error, &FLOYD_STEINBERG);

        let total = features
            .cells()
            .iter()
            .fold(Rgb::BLACK, |acc, c| acc + c.error);
        assert!((total.r - error.r).abs() < 1e-6);
        assert!((total.g - error.g).abs() < 1e-6);
        assert!((total.b - error.b).abs() < 1e-6);
        assert_eq!(features.get(1, 0).error, Rgb::BLACK);

        let mut edge = SourceFeatures::from_cells(3, 3, blank);
        edge.diffuse_error(2, 0, Rgb::new(1.6, 1.6, 1.6), &FLOYD_STEINBERG);
        let kept = edge.cells().iter().map(|c| c.error.r).sum::<f32>();
        // Only the 3/16 and 5/16 shares stay inside
        assert!((kept - 0.8).abs() < 1e-5);
    }

    // ========================================================================
    // End to end
    // ========================================================================

    /// If this breaks, it means: transparent glyph margins are being
    /// compared as colour instead of through the alpha channel. On a white
    /// background a white circle (transparent corners) must beat a black
    /// square for a plain white image, and greedy diffusion must keep it.
    #[test]
    fn test_white_image_renders_white_circles() {
        let size = 4;
        let circle = FeatureGrid::from_fn(size, |x, y| {
            let corner = (x == 0 || x == size - 1) && (y == 0 || y == size - 1);
            Cell::new(1.0, 1.0, 1.0, if corner { 0.0 } else { 1.0 })
        });
        let corpus = single_background(size, vec![("⚪", circle), ("⬛", grey(size, 0.0))]);
        let image = SourceImage::solid(8, 8, Rgb::WHITE);

        let report = EmojiMosaic::new(&corpus)
            .columns(2)
            .refine(RefinePolicy::Unconditional)
            .diffuse(DiffuserOptions::new().initial_temperature(0.0))
            .seed(7)
            .render(&image)
            .unwrap();
        assert_eq!(report.refine_status, Some(RefineStatus::Skipped));
        assert_eq!(report.mosaic.to_string(), "⚪⚪\n⚪⚪");
    }
}
