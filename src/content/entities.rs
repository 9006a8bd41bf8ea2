//! Entity linking: recognizes known mental-health concepts in answer text
//! and links the first occurrence of each to its external reference.
//!
//! The side list of matches feeds the structured-data generator (`about`
//! annotations), which is why this stage runs even though unmapped external
//! links are stripped again before render.

use regex::Regex;
use serde::Serialize;

/// A recognized mental-health concept with a canonical name and an
/// authoritative external reference.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: &'static str,
    pub url: &'static str,
    /// schema.org type used in `about` annotations (MedicalCondition,
    /// MedicalTherapy, Drug, Thing).
    pub schema_type: &'static str,
    pub description: &'static str,
}

/// One entity occurrence found in a document.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntityMatch {
    pub term: String,
    pub url: String,
    pub name: String,
}

/// Result of running the entity linker over a document.
#[derive(Debug, Clone)]
pub struct EntityLinked {
    pub text: String,
    pub links: Vec<EntityMatch>,
}

/// Immutable term-key → entity table, with match patterns compiled once.
pub struct EntityTable {
    entries: Vec<(&'static str, Entity, Regex)>,
    open_anchor: Regex,
}

impl EntityTable {
    /// Build the built-in entity table. Keys are static and controlled, so
    /// patterns need no metacharacter escaping; word boundaries prevent
    /// prefix matches ("adult" must not match inside "adulthood").
    pub fn builtin() -> Self {
        let entries = builtin_entities()
            .into_iter()
            .map(|(key, entity)| {
                let pattern = Regex::new(&format!(r"(?i)\b{key}\b"))
                    .expect("builtin entity keys are valid patterns");
                (key, entity, pattern)
            })
            .collect();
        Self {
            entries,
            open_anchor: Regex::new(r"<a[^>]*>").expect("open anchor pattern is valid"),
        }
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entity by its term key.
    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entries
            .iter()
            .find(|(k, _, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, e, _)| e)
    }

    /// Wrap the first textual occurrence of each matched entity term in an
    /// anchor to its external reference, and collect the matches.
    ///
    /// Only the first occurrence per term is replaced; repeats of the same
    /// term stay plain text. The anchor text is the entity's canonical name.
    /// Occurrences inside markup (an href slug, an attribute value, the text
    /// of an existing anchor) are never replaced and do not count as matches.
    pub fn generate_entity_links(&self, text: &str) -> EntityLinked {
        let mut processed = text.to_string();
        let mut links = Vec::new();

        for (key, entity, pattern) in &self.entries {
            let Some((start, end)) = self.first_linkable(pattern, &processed) else {
                continue;
            };
            links.push(EntityMatch {
                term: (*key).to_string(),
                url: entity.url.to_string(),
                name: entity.name.to_string(),
            });
            let anchor = format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                entity.url, entity.name
            );

            let mut out = String::with_capacity(processed.len() + anchor.len());
            out.push_str(&processed[..start]);
            out.push_str(&anchor);
            out.push_str(&processed[end..]);
            processed = out;
        }

        EntityLinked {
            text: processed,
            links,
        }
    }

    /// First pattern match that sits in visible text rather than inside a
    /// tag or an existing anchor. Same raw tag counting as the internal
    /// term linker uses.
    fn first_linkable(&self, pattern: &Regex, text: &str) -> Option<(usize, usize)> {
        for m in pattern.find_iter(text) {
            let before = &text[..m.start()];

            let opens = self.open_anchor.find_iter(before).count();
            let closes = before.matches("</a>").count();
            let inside_anchor = opens > closes;
            let inside_tag = match (before.rfind('<'), before.rfind('>')) {
                (Some(open), Some(close)) => open > close,
                (Some(_), None) => true,
                _ => false,
            };

            if !inside_anchor && !inside_tag {
                return Some((m.start(), m.end()));
            }
        }
        None
    }

    /// Extract entities mentioned in free text, for schema `about` fields.
    /// Matches on term key or canonical name substring, capped at the top 5.
    pub fn extract_entities(&self, text: &str) -> Vec<&Entity> {
        let lower = text.to_lowercase();
        self.entries
            .iter()
            .filter(|(key, entity, _)| {
                lower.contains(&key.to_lowercase()) || lower.contains(&entity.name.to_lowercase())
            })
            .map(|(_, entity, _)| entity)
            .take(5)
            .collect()
    }
}

/// Core mental-health entities mapped to authoritative sources.
/// Iteration order is the match order of the linker.
fn builtin_entities() -> Vec<(&'static str, Entity)> {
    vec![
        // Core conditions
        (
            "anxiety",
            Entity {
                name: "Anxiety disorder",
                url: "https://en.wikipedia.org/wiki/Anxiety_disorder",
                schema_type: "MedicalCondition",
                description: "A group of mental disorders characterized by significant feelings of anxiety and fear",
            },
        ),
        (
            "depression",
            Entity {
                name: "Major depressive disorder",
                url: "https://en.wikipedia.org/wiki/Major_depressive_disorder",
                schema_type: "MedicalCondition",
                description: "A mental disorder characterized by at least two weeks of pervasive low mood",
            },
        ),
        (
            "ptsd",
            Entity {
                name: "Post-traumatic stress disorder",
                url: "https://en.wikipedia.org/wiki/Post-traumatic_stress_disorder",
                schema_type: "MedicalCondition",
                description: "A mental disorder that can develop after exposure to a traumatic event",
            },
        ),
        (
            "ocd",
            Entity {
                name: "Obsessive-compulsive disorder",
                url: "https://en.wikipedia.org/wiki/Obsessive%E2%80%93compulsive_disorder",
                schema_type: "MedicalCondition",
                description: "A mental disorder characterized by intrusive thoughts and repetitive behaviors",
            },
        ),
        (
            "bipolar",
            Entity {
                name: "Bipolar disorder",
                url: "https://en.wikipedia.org/wiki/Bipolar_disorder",
                schema_type: "MedicalCondition",
                description: "A mental disorder characterized by periods of depression and elevated mood",
            },
        ),
        (
            "adhd",
            Entity {
                name: "Attention deficit hyperactivity disorder",
                url: "https://en.wikipedia.org/wiki/Attention_deficit_hyperactivity_disorder",
                schema_type: "MedicalCondition",
                description: "A neurodevelopmental disorder characterized by inattention and hyperactivity",
            },
        ),
        (
            "autism",
            Entity {
                name: "Autism spectrum disorder",
                url: "https://en.wikipedia.org/wiki/Autism_spectrum",
                schema_type: "MedicalCondition",
                description: "A neurodevelopmental disorder characterized by difficulties in social interaction",
            },
        ),
        (
            "eating-disorders",
            Entity {
                name: "Eating disorder",
                url: "https://en.wikipedia.org/wiki/Eating_disorder",
                schema_type: "MedicalCondition",
                description: "Mental disorders defined by abnormal eating habits that negatively affect physical or mental health",
            },
        ),
        (
            "substance-abuse",
            Entity {
                name: "Substance use disorder",
                url: "https://en.wikipedia.org/wiki/Substance_use_disorder",
                schema_type: "MedicalCondition",
                description: "A condition in which the use of one or more substances leads to clinically significant impairment",
            },
        ),
        (
            "schizophrenia",
            Entity {
                name: "Schizophrenia",
                url: "https://en.wikipedia.org/wiki/Schizophrenia",
                schema_type: "MedicalCondition",
                description: "A mental disorder characterized by abnormal behavior and a decreased ability to understand reality",
            },
        ),
        // Therapies and treatments
        (
            "therapy",
            Entity {
                name: "Psychotherapy",
                url: "https://en.wikipedia.org/wiki/Psychotherapy",
                schema_type: "MedicalTherapy",
                description: "The use of psychological methods to help a person change behavior and overcome problems",
            },
        ),
        (
            "cbt",
            Entity {
                name: "Cognitive behavioral therapy",
                url: "https://en.wikipedia.org/wiki/Cognitive_behavioral_therapy",
                schema_type: "MedicalTherapy",
                description: "A psycho-social intervention that aims to improve mental health",
            },
        ),
        (
            "dbt",
            Entity {
                name: "Dialectical behavior therapy",
                url: "https://en.wikipedia.org/wiki/Dialectical_behavior_therapy",
                schema_type: "MedicalTherapy",
                description: "A type of cognitive behavioral therapy for treating personality disorders",
            },
        ),
        (
            "medication",
            Entity {
                name: "Psychiatric medication",
                url: "https://en.wikipedia.org/wiki/Psychiatric_medication",
                schema_type: "Drug",
                description: "Medications used to treat mental disorders",
            },
        ),
        (
            "mindfulness",
            Entity {
                name: "Mindfulness",
                url: "https://en.wikipedia.org/wiki/Mindfulness",
                schema_type: "MedicalTherapy",
                description: "The practice of purposely focusing attention on the present moment",
            },
        ),
        (
            "meditation",
            Entity {
                name: "Meditation",
                url: "https://en.wikipedia.org/wiki/Meditation",
                schema_type: "MedicalTherapy",
                description: "A practice where an individual uses a technique to focus attention",
            },
        ),
        // Mental health concepts
        (
            "self-care",
            Entity {
                name: "Self-care",
                url: "https://en.wikipedia.org/wiki/Self-care",
                schema_type: "Thing",
                description: "The practice of taking action to preserve or improve one's own health",
            },
        ),
        (
            "mental-health",
            Entity {
                name: "Mental health",
                url: "https://en.wikipedia.org/wiki/Mental_health",
                schema_type: "Thing",
                description: "A level of psychological well-being or an absence of mental illness",
            },
        ),
        (
            "wellness",
            Entity {
                name: "Wellness",
                url: "https://en.wikipedia.org/wiki/Wellness_(alternative_medicine)",
                schema_type: "Thing",
                description: "An active process of becoming aware of and making choices toward a healthy and fulfilling life",
            },
        ),
        (
            "resilience",
            Entity {
                name: "Psychological resilience",
                url: "https://en.wikipedia.org/wiki/Psychological_resilience",
                schema_type: "Thing",
                description: "The ability to mentally or emotionally cope with a crisis or to return to pre-crisis status quickly",
            },
        ),
        (
            "stress",
            Entity {
                name: "Psychological stress",
                url: "https://en.wikipedia.org/wiki/Psychological_stress",
                schema_type: "MedicalCondition",
                description: "A feeling of emotional or physical tension",
            },
        ),
        (
            "burnout",
            Entity {
                name: "Occupational burnout",
                url: "https://en.wikipedia.org/wiki/Occupational_burnout",
                schema_type: "MedicalCondition",
                description: "A state of emotional, physical, and mental exhaustion caused by excessive and prolonged stress",
            },
        ),
        // Relationships and social
        (
            "relationships",
            Entity {
                name: "Interpersonal relationship",
                url: "https://en.wikipedia.org/wiki/Interpersonal_relationship",
                schema_type: "Thing",
                description: "A strong, deep, or close association or acquaintance between two or more people",
            },
        ),
        (
            "communication",
            Entity {
                name: "Communication",
                url: "https://en.wikipedia.org/wiki/Communication",
                schema_type: "Thing",
                description: "The act of conveying meanings from one entity or group to another",
            },
        ),
        (
            "boundaries",
            Entity {
                name: "Personal boundaries",
                url: "https://en.wikipedia.org/wiki/Personal_boundaries",
                schema_type: "Thing",
                description: "Guidelines, rules or limits that a person creates to identify reasonable, safe and permissible ways",
            },
        ),
        (
            "attachment",
            Entity {
                name: "Attachment theory",
                url: "https://en.wikipedia.org/wiki/Attachment_theory",
                schema_type: "Thing",
                description: "A psychological, evolutionary and ethological theory concerning relationships between humans",
            },
        ),
        // Life stages and transitions
        (
            "adolescence",
            Entity {
                name: "Adolescence",
                url: "https://en.wikipedia.org/wiki/Adolescence",
                schema_type: "Thing",
                description: "A transitional stage of physical and psychological development",
            },
        ),
        (
            "adulthood",
            Entity {
                name: "Adult",
                url: "https://en.wikipedia.org/wiki/Adult",
                schema_type: "Thing",
                description: "A human or other organism that has reached sexual maturity",
            },
        ),
        (
            "aging",
            Entity {
                name: "Ageing",
                url: "https://en.wikipedia.org/wiki/Ageing",
                schema_type: "Thing",
                description: "The process of becoming older",
            },
        ),
        (
            "grief",
            Entity {
                name: "Grief",
                url: "https://en.wikipedia.org/wiki/Grief",
                schema_type: "MedicalCondition",
                description: "The response to loss, particularly to the loss of someone or something that has died",
            },
        ),
        (
            "trauma",
            Entity {
                name: "Psychological trauma",
                url: "https://en.wikipedia.org/wiki/Psychological_trauma",
                schema_type: "MedicalCondition",
                description: "Damage to the mind that occurs as a result of a distressing event",
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_first_occurrence_only() {
        let table = EntityTable::builtin();
        let out = table.generate_entity_links("Anxiety is hard. anxiety again.");

        // First occurrence becomes an anchor to the reference URL.
        assert!(out
            .text
            .starts_with(r#"<a href="https://en.wikipedia.org/wiki/Anxiety_disorder""#));
        // Second occurrence stays plain.
        assert!(out.text.ends_with("anxiety again."));
        assert_eq!(out.links.len(), 1);
        assert_eq!(out.links[0].term, "anxiety");
        assert_eq!(out.links[0].name, "Anxiety disorder");
    }

    #[test]
    fn whole_word_match_only() {
        let table = EntityTable::builtin();
        // "grief" must not match inside "griefless" (no such word boundary).
        let out = table.generate_entity_links("a grieflike feeling");
        assert!(out.links.is_empty());
        assert_eq!(out.text, "a grieflike feeling");
    }

    #[test]
    fn collects_all_distinct_matches() {
        let table = EntityTable::builtin();
        let out = table.generate_entity_links("stress and burnout at work");
        let terms: Vec<&str> = out.links.iter().map(|l| l.term.as_str()).collect();
        assert_eq!(terms, vec!["stress", "burnout"]);
    }

    #[test]
    fn case_insensitive() {
        let table = EntityTable::builtin();
        let out = table.generate_entity_links("DEPRESSION affects many");
        assert_eq!(out.links.len(), 1);
        assert_eq!(out.links[0].url, "https://en.wikipedia.org/wiki/Major_depressive_disorder");
    }

    #[test]
    fn occurrence_inside_href_is_skipped() {
        let table = EntityTable::builtin();
        let input = r#"<a href="https://en.wikipedia.org/wiki/Grief">a hard loss</a>"#;
        // The only "grief" sits in the URL slug: leave the anchor intact.
        let out = table.generate_entity_links(input);
        assert_eq!(out.text, input);
        assert!(out.links.is_empty());
    }

    #[test]
    fn occurrence_inside_anchor_text_is_skipped() {
        let table = EntityTable::builtin();
        let input = r#"<a href="/answers/x">living with anxiety</a>"#;
        let out = table.generate_entity_links(input);
        assert_eq!(out.text, input);
        assert!(out.links.is_empty());
    }

    #[test]
    fn later_plain_occurrence_is_linked_when_first_is_markup() {
        let table = EntityTable::builtin();
        let input = r#"<img alt="therapy session"> Therapy can help."#;
        let out = table.generate_entity_links(input);
        assert!(out.text.contains(r#"alt="therapy session""#));
        assert!(out.text.contains(">Psychotherapy</a> can help."));
        assert_eq!(out.links.len(), 1);
    }

    #[test]
    fn extract_entities_capped_at_five() {
        let table = EntityTable::builtin();
        let text = "anxiety depression ptsd ocd bipolar adhd autism stress";
        let found = table.extract_entities(text);
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn extract_matches_canonical_name_too() {
        let table = EntityTable::builtin();
        let found = table.extract_entities("living with Obsessive-compulsive disorder");
        assert!(found.iter().any(|e| e.name == "Obsessive-compulsive disorder"));
    }
}
