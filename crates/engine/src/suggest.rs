/// Closest candidate to `input` by Jaro-Winkler similarity, if any reaches
/// `threshold`. Exact matches are not suggestions and return `None`.
pub fn closest<'a, I>(input: &str, candidates: I, threshold: f64) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = input.to_lowercase();

    candidates
        .into_iter()
        .filter(|c| *c != input)
        .map(|c| (c, strsim::jaro_winkler(&needle, &c.to_lowercase())))
        .filter(|(_, score)| *score >= threshold)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}
