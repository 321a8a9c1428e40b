use autopilot_core::WorkItemId;

/// The line an agent prints when it has finished `work_item`.
pub fn completion_marker(work_item: &WorkItemId) -> String {
    format!("TASK_COMPLETE: {work_item}")
}

/// Decides from captured session output whether a work item is done.
pub trait CompletionDetector: Send + Sync {
    fn is_complete(&self, work_item: &WorkItemId, output: &str) -> bool;
}

/// Looks for the literal [`completion_marker`] anywhere in the output.
///
/// Deliberately stricter than a plain substring search: the marker must not
/// run on into further identifier characters (alphanumerics, `-` or `_`), so
/// the marker for `ENG-1` is not satisfied by `TASK_COMPLETE: ENG-12` or
/// `TASK_COMPLETE: ENG-1x`. Any other character, or end of output, ends it.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkerDetector;

impl CompletionDetector for MarkerDetector {
    fn is_complete(&self, work_item: &WorkItemId, output: &str) -> bool {
        let marker = completion_marker(work_item);
        output.match_indices(&marker).any(|(at, _)| {
            output[at + marker.len()..]
                .chars()
                .next()
                .map_or(true, |next| !is_identifier_char(next))
        })
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_format() {
        assert_eq!(completion_marker(&WorkItemId::from_raw("ENG-12")), "TASK_COMPLETE: ENG-12");
    }

    #[test]
    fn detects_marker_in_surrounding_output() {
        let id = WorkItemId::from_raw("ENG-12");
        assert!(MarkerDetector.is_complete(&id, "pushed branch\nTASK_COMPLETE: ENG-12\n$ "));
        assert!(!MarkerDetector.is_complete(&id, "still working on ENG-12"));
    }

    #[test]
    fn marker_for_other_item_does_not_match() {
        let id = WorkItemId::from_raw("ENG-1");
        assert!(!MarkerDetector.is_complete(&id, "TASK_COMPLETE: ENG-2"));
    }

    #[test]
    fn marker_prefix_of_longer_id_does_not_match() {
        let id = WorkItemId::from_raw("ENG-1");
        assert!(!MarkerDetector.is_complete(&id, "TASK_COMPLETE: ENG-12"));
        assert!(MarkerDetector.is_complete(&id, "TASK_COMPLETE: ENG-12\nTASK_COMPLETE: ENG-1"));
    }

    #[test]
    fn marker_running_into_identifier_characters_does_not_match() {
        let id = WorkItemId::from_raw("ENG-1");
        for output in ["TASK_COMPLETE: ENG-1x", "TASK_COMPLETE: ENG-1_b", "TASK_COMPLETE: ENG-1-2"] {
            assert!(!MarkerDetector.is_complete(&id, output), "{output}");
        }
        assert!(MarkerDetector.is_complete(&id, "TASK_COMPLETE: ENG-1 done"));
    }

    #[test]
    fn marker_followed_by_punctuation_matches() {
        let id = WorkItemId::from_raw("ENG-12");
        assert!(MarkerDetector.is_complete(&id, "...TASK_COMPLETE: ENG-12..."));
        assert!(MarkerDetector.is_complete(&id, "TASK_COMPLETE: ENG-12"));
    }
}
