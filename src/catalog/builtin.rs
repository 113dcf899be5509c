//! The built-in stage list and event catalog.

use super::event::Event;
use super::severity::Severity;
use super::stage::{Stage, StageId};

/// The five default life stages, career start to retirement.
#[must_use]
pub fn stages() -> Vec<Stage> {
    [
        ("first-job", "First Job", "Starting your career journey"),
        ("marriage", "Marriage", "Building a life together"),
        ("parenthood", "Parenthood", "Welcoming a new life"),
        ("mid-career", "Mid-Career", "Peak responsibilities"),
        ("retirement", "Retirement", "Securing your golden years"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((id, label, description), order)| Stage {
        id: StageId::new(id),
        label: label.to_string(),
        description: description.to_string(),
        order,
    })
    .collect()
}

/// Three events per stage, one of each known severity.
#[must_use]
pub fn events() -> Vec<Event> {
    use Severity::{High, Medium, Moderate};

    vec![
        // First job
        Event::new(
            "fj-01",
            "first-job",
            "Sudden Medical Emergency",
            "A critical health issue requires immediate hospitalisation. Medical bills are piling up fast.",
            High,
        ),
        Event::new(
            "fj-02",
            "first-job",
            "Bike Accident Injury",
            "A road accident leaves you with injuries needing weeks of recovery and treatment costs.",
            Medium,
        ),
        Event::new(
            "fj-03",
            "first-job",
            "Laptop Theft",
            "Your work laptop and valuables are stolen from your paying guest accommodation.",
            Moderate,
        ),
        // Marriage
        Event::new(
            "mr-01",
            "marriage",
            "Spouse Critical Illness",
            "Your spouse is diagnosed with a critical illness requiring expensive long-term treatment.",
            High,
        ),
        Event::new(
            "mr-02",
            "marriage",
            "Home Loan EMI Default Risk",
            "An unexpected job change puts your home loan EMI payments at risk for several months.",
            Medium,
        ),
        Event::new(
            "mr-03",
            "marriage",
            "Wedding Expense Overrun",
            "Wedding expenses significantly exceeded the budget, eating into your emergency fund.",
            Moderate,
        ),
        // Parenthood
        Event::new(
            "ph-01",
            "parenthood",
            "Child Born with Health Complications",
            "Your newborn requires NICU care and specialised treatment for several weeks.",
            High,
        ),
        Event::new(
            "ph-02",
            "parenthood",
            "Daycare & Education Cost Spike",
            "Premium childcare and education costs have doubled, straining your monthly budget.",
            Medium,
        ),
        Event::new(
            "ph-03",
            "parenthood",
            "Parental Emergency Travel",
            "An elderly parent falls ill in another city, requiring urgent travel and medical support.",
            Moderate,
        ),
        // Mid-career
        Event::new(
            "mc-01",
            "mid-career",
            "Disability from Workplace Injury",
            "A serious workplace accident causes partial disability, impacting your ability to earn.",
            High,
        ),
        Event::new(
            "mc-02",
            "mid-career",
            "Business Venture Failure",
            "A side business investment crashes, wiping out a significant portion of your savings.",
            Medium,
        ),
        Event::new(
            "mc-03",
            "mid-career",
            "Child's Higher Education Abroad",
            "Your child gets admission overseas. The tuition and living costs are substantial.",
            Moderate,
        ),
        // Retirement
        Event::new(
            "rt-01",
            "retirement",
            "Longevity Risk: Outliving Savings",
            "Medical advances mean you may live 15+ years post-retirement. Will your corpus last?",
            High,
        ),
        Event::new(
            "rt-02",
            "retirement",
            "Inflation Eroding Pension",
            "Rising inflation has significantly reduced the purchasing power of your pension income.",
            Medium,
        ),
        Event::new(
            "rt-03",
            "retirement",
            "Elderly Care Dependency",
            "Aging parents or your own need for full-time care creates recurring monthly expenses.",
            Moderate,
        ),
    ]
}
